//! `define_port_error!` declares a port error enum with one snake_case
//! constructor per variant. Constructor arguments take `impl Into<Field>`, so
//! adapters can pass `&str` or a status code without converting first.

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
    use rstest::rstest;

    define_port_error! {
        pub enum MailRelayError {
            Closed => "relay closed",
            Refused { status: u16, message: String } => "refused ({status}): {message}",
            Down { message: String } => "down: {message}",
        }
    }

    #[rstest]
    #[case(MailRelayError::closed(), "relay closed")]
    #[case(MailRelayError::refused(550_u16, "mailbox unavailable"), "refused (550): mailbox unavailable")]
    #[case(MailRelayError::down(String::from("timeout")), "down: timeout")]
    fn constructors_render_their_message(#[case] err: MailRelayError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn constructors_fill_named_fields() {
        assert_eq!(
            MailRelayError::refused(503_u16, "busy"),
            MailRelayError::Refused {
                status: 503,
                message: "busy".to_owned(),
            }
        );
    }
}
