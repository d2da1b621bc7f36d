use crate::models::question::is_option_letter;
use validator::ValidationError;

pub fn option_letter(value: &str) -> Result<(), ValidationError> {
    if is_option_letter(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("option_letter");
        err.message = Some("correct_answer must be one of A, B, C, D".into());
        Err(err)
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

pub fn role_name(value: &str) -> Result<(), ValidationError> {
    match value.parse::<crate::models::user::Role>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("role");
            err.message = Some("role must be student, teacher or admin".into());
            Err(err)
        }
    }
}
