/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::service::ServiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(crate::service::ServiceError::InvalidField {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

pub(crate) use str_enum;

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(AlertType {
    Autoimmune => "autoimmune",
    Inflammatory => "inflammatory",
    Oncology => "oncology",
});

str_enum!(AlertSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use std::str::FromStr;

    #[test]
    fn gender_round_trips() {
        for g in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(Gender::from_str(g.as_str()).unwrap(), g);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = AlertSeverity::from_str("catastrophic").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "AlertSeverity", .. }));
    }
}
