// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type definition macros.

/// Create an enum that can convert from its integer representation.
///
/// Besides `TryFrom<repr>`, the generated enum gets a `VARIANTS` table
/// listing every variant in declaration order.
///
/// # Example
///
/// ```
/// use maki_macros::int_enum;
///
/// int_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     pub enum Primitive: u8 {
///         Int = 2,
///         Float = 3,
///     }
/// }
///
/// assert_eq!(Primitive::Float as u8, 3);
/// assert_eq!(Primitive::try_from(2u8), Ok(Primitive::Int));
/// assert!(Primitive::try_from(7u8).is_err());
/// assert_eq!(Primitive::VARIANTS.len(), 2);
/// ```
#[macro_export]
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),+];
        }

        impl TryFrom<$repr> for $name {
            type Error = $repr;

            fn try_from(value: $repr) -> Result<Self, $repr> {
                match value {
                    $(v if v == $value => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }
    };
}
