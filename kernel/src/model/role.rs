use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString)]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_from_its_stored_name() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert!("Visitor".parse::<Role>().is_err());
    }
}
