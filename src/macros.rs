// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Declarative registration into the global registry.

/// Declare a polymorphic root in the global registry.
///
/// ```
/// use polycodec::register_root;
///
/// trait Event: polycodec::Encode {}
///
/// register_root!(dyn Event, field = "type");
/// ```
#[macro_export]
macro_rules! register_root {
    ($root:ty, field = $field:expr $(,)?) => {
        const _: () = {
            fn __register(builder: &mut $crate::registry::RegistryBuilder) {
                builder.add_root::<$root>($crate::RootSpec::new($field));
            }

            $crate::inventory::submit! {
                $crate::registry::Registration::new(::core::module_path!(), __register)
            }
        };
    };
}

/// Declare a concrete variant of a root in the global registry.
///
/// The type is created with `Default::default()` unless a `ctor` is given.
///
/// ```
/// use polycodec::{register_root, register_variant};
/// use serde::{Deserialize, Serialize};
///
/// trait Event: polycodec::Encode {}
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Click {
///     x: i32,
///     y: i32,
/// }
///
/// impl Event for Click {}
///
/// register_root!(dyn Event, field = "type");
/// register_variant!(Click => dyn Event, value = "click");
/// ```
#[macro_export]
macro_rules! register_variant {
    ($ty:ty => $root:ty, value = $value:expr $(,)?) => {
        $crate::register_variant!($ty => $root, value = $value, ctor = <$ty as ::core::default::Default>::default);
    };
    ($ty:ty => $root:ty, value = $value:expr, ctor = $ctor:expr $(,)?) => {
        const _: () = {
            fn __register(builder: &mut $crate::registry::RegistryBuilder) {
                builder.add_variant_with::<$root, $ty>($value, $ctor, |v| v);
            }

            $crate::inventory::submit! {
                $crate::registry::Registration::new(::core::module_path!(), __register)
            }
        };
    };
}
