use crate::models::UserType;

const NORMAL_USER_PROMPT: &str = "
You are a helpful assistant providing clear and simple explanations about medicines.
Given an image of a tablet label, provide the following:
1. Tablet name
2. Uses (in everyday terms)
3. Common side effects
4. When to take it and any precautions
5. Warnings or interactions
Keep the language simple and easy for non-medical users to understand.
";

const MEDICAL_SPECIALIST_PROMPT: &str = "
You are a medical expert summarizing detailed pharmaceutical data.
Given an image of a tablet label, provide:
1. Drug/Tablet name and composition
2. Pharmacological class, mechanism of action
3. Clinical indications, dosages, contraindications
4. Adverse reactions, interactions, precautions
5. Referencing current WHO/FDA standards if applicable
Use technical medical language suitable for healthcare professionals.
";

pub fn prompt_for(user_type: UserType) -> &'static str {
    match user_type {
        UserType::NormalUser => NORMAL_USER_PROMPT,
        UserType::MedicalSpecialist => MEDICAL_SPECIALIST_PROMPT,
    }
}

/// Template plus the user's note, in the layout the model is asked to complete.
pub fn build_full_prompt(user_type: UserType, note: &str) -> String {
    format!(
        "{}\n\nTablet Details: {}\n\nSummary:",
        prompt_for(user_type),
        note
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_depends_on_user_type() {
        assert!(prompt_for(UserType::NormalUser).contains("non-medical users"));
        assert!(prompt_for(UserType::MedicalSpecialist).contains("healthcare professionals"));
    }

    #[test]
    fn test_full_prompt_layout() {
        let prompt = build_full_prompt(UserType::NormalUser, "Crocin 650");
        assert!(prompt.starts_with(NORMAL_USER_PROMPT));
        assert!(prompt.ends_with("\n\nTablet Details: Crocin 650\n\nSummary:"));

        let empty = build_full_prompt(UserType::MedicalSpecialist, "");
        assert!(empty.ends_with("Tablet Details: \n\nSummary:"));
    }
}
