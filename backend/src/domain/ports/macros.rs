//! Helper macro for port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything convertible into the declared type, so adapters can
//! write `AccountPersistenceError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::IdentifierKind;

    define_port_error! {
        pub enum ExampleStoreError {
            Offline => "store offline",
            Query { message: String } => "query failed: {message}",
            Duplicate { field: IdentifierKind } => "duplicate {field}",
            Timeout { message: String, attempts: u32 } => "timeout: {message} after {attempts}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExampleStoreError::offline().to_string(), "store offline");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleStoreError::query("syntax error");
        assert_eq!(err.to_string(), "query failed: syntax error");
    }

    #[test]
    fn constructors_preserve_domain_types() {
        let err = ExampleStoreError::duplicate(IdentifierKind::Phone);
        assert_eq!(
            err,
            ExampleStoreError::Duplicate {
                field: IdentifierKind::Phone
            }
        );
        assert_eq!(err.to_string(), "duplicate phone");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleStoreError::timeout("pool", 3_u32);
        assert_eq!(err.to_string(), "timeout: pool after 3");
    }
}
