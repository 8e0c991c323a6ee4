// Declarative helpers exported for users of the crate.
// The #[derive(Bind)] macro lives in the config-bindr-macros crate.

/// Declare that one or more types coerce themselves through [`Setter`](crate::Setter).
///
/// The types must also implement `Default` and `PartialEq`; the default value
/// is treated as the type's zero value.
#[macro_export]
macro_rules! impl_setter {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FieldValue for $ty {
            fn kind() -> $crate::Kind {
                $crate::Kind::Custom(::std::any::type_name::<$ty>())
            }

            fn set(
                &mut self,
                raw: &str,
                _rules: &$crate::Rules<'_>,
            ) -> ::std::result::Result<(), $crate::BindError> {
                $crate::Setter::set_value(self, raw)
                    .map_err(|err| $crate::BindError::coercion(raw, <Self as $crate::FieldValue>::kind(), err))
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::std::default::Default>::default()
            }
        }
    )+};
}
