//! User profile display

use super::Formatter;
use crate::models::User;

pub fn format_profile(_fmt: &Formatter, user: &User) -> String {
    let mut output = String::new();
    output.push_str(&format!("Name:     {}\n", user.display_name()));
    output.push_str(&format!("Email:    {}\n", user.email));
    if let Some(username) = user.username.as_deref().filter(|u| !u.is_empty()) {
        output.push_str(&format!("Username: {}\n", username));
    }
    if let Some(avatar) = user.avatar.as_deref().filter(|a| !a.is_empty()) {
        output.push_str(&format!("Avatar:   {}\n", avatar));
    }
    if let Some(joined) = user.date_joined {
        output.push_str(&format!("Joined:   {}\n", joined.format("%Y-%m-%d")));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "email": "ada@example.com", "username": "ada",
                "date_joined": "2024-01-05T10:00:00Z"}"#,
        )
        .unwrap();
        let output = format_profile(&Formatter::default(), &user);
        assert!(output.contains("Name:     ada"));
        assert!(output.contains("Joined:   2024-01-05"));
        assert!(!output.contains("Avatar"));
    }
}
