//! `define_port_error!`: error enums for the driven ports.
//!
//! Each variant gets a snake_case constructor. Field arguments take
//! `impl Into<T>` so adapters can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$doc:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$doc])*
                #[error($message)]
                $variant $( { $($field: $ty),+ } )?,
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),+ )?) -> Self {
                        Self::$variant $( { $($field: $field.into()),+ } )?
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum UploadError {
            Offline => "storage offline",
            TooLarge { key: String, limit: usize } => "{key} exceeds {limit} bytes",
        }
    }

    #[test]
    fn unit_variant_constructor() {
        assert_eq!(UploadError::offline(), UploadError::Offline);
        assert_eq!(UploadError::offline().to_string(), "storage offline");
    }

    #[test]
    fn field_constructor_converts_arguments() {
        let err = UploadError::too_large("avatar.png", 5_usize);
        assert_eq!(
            err,
            UploadError::TooLarge {
                key: "avatar.png".to_owned(),
                limit: 5
            }
        );
        assert_eq!(err.to_string(), "avatar.png exceeds 5 bytes");
    }
}
