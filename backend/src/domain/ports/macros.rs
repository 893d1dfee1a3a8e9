//! `define_port_error!` builds the error enums returned by driven ports.
//!
//! Every variant carries named text fields and a display template. Each
//! variant also gets a snake-case constructor taking `impl Into<String>` per
//! field, so adapters can pass `&str`, `String` or formatted messages:
//!
//! ```text
//! define_port_error! {
//!     pub enum GroupRepositoryError {
//!         DuplicateSlug { slug } => "group slug {slug} already exists",
//!     }
//! }
//!
//! GroupRepositoryError::duplicate_slug("grupo-norte")
//! ```

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant {
                    $(
                        #[doc = concat!("Reported `", stringify!($field), "`.")]
                        $field: String
                    ),+
                },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build `", stringify!($name), "::", stringify!($variant), "`.")]
                    pub fn [<$variant:snake>]($($field: impl Into<String>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;
