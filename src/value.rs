use bevy::{
    prelude::*,
    reflect::{DynamicEnum, DynamicVariant, ReflectPath, ReflectRef, TypeInfo},
};

use crate::InspectorError;

/// Value at `path` inside `root`. The empty path is the root itself.
pub(crate) fn value_at<'r>(
    root: &'r dyn PartialReflect,
    path: &str,
) -> Result<&'r dyn PartialReflect, InspectorError> {
    if path.is_empty() {
        return Ok(root);
    }
    path.reflect_element(root).map_err(|err| InspectorError::Path {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn value_at_mut<'r>(
    root: &'r mut dyn PartialReflect,
    path: &str,
) -> Result<&'r mut dyn PartialReflect, InspectorError> {
    if path.is_empty() {
        return Ok(root);
    }
    path.reflect_element_mut(root)
        .map_err(|err| InspectorError::Path {
            path: path.to_string(),
            reason: err.to_string(),
        })
}

/// True for `None` values of an `Option`.
pub(crate) fn is_none_option(value: &dyn PartialReflect) -> bool {
    let ReflectRef::Enum(enum_ref) = value.reflect_ref() else {
        return false;
    };
    enum_ref.variant_name() == "None"
        && value
            .get_represented_type_info()
            .and_then(proptree_catalog::option_payload)
            .is_some()
}

/// Canonical text of a leaf value.
pub fn format_value(value: &dyn PartialReflect) -> String {
    macro_rules! display {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = value.try_downcast_ref::<$ty>() {
                    return format!("{v}");
                }
            )*
        };
    }
    display!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char, String);

    if let ReflectRef::Enum(enum_ref) = value.reflect_ref()
        && enum_ref.field_len() == 0
    {
        return enum_ref.variant_name().to_string();
    }

    // Fallback: show type name if available, otherwise Debug
    if let Some(info) = value.get_represented_type_info() {
        return format!("<{}>", info.type_path_table().short_path());
    }
    format!("{value:?}")
}

/// Parse `text` into `target`, leaving it untouched when the text does not convert.
pub fn parse_into_reflect(target: &mut dyn PartialReflect, text: &str) -> bool {
    macro_rules! parse {
        ($($ty:ty),*) => {
            $(
                if let Some(current) = target.try_downcast_mut::<$ty>() {
                    return match text.trim().parse::<$ty>() {
                        Ok(v) => {
                            *current = v;
                            true
                        }
                        Err(_) => false,
                    };
                }
            )*
        };
    }
    parse!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char);

    if let Some(current) = target.try_downcast_mut::<String>() {
        *current = text.to_string();
        return true;
    }

    // Unit-only enums take a variant name.
    if let Some(info @ TypeInfo::Enum(enum_info)) = target.get_represented_type_info()
        && proptree_catalog::is_unit_only_enum(info)
    {
        let name = text.trim();
        if enum_info.variant(name).is_none() {
            return false;
        }
        let mut variant = DynamicEnum::new(name, DynamicVariant::Unit);
        variant.set_represented_type(Some(info));
        return target.try_apply(&variant).is_ok();
    }
    false
}

/// Whether `text` would convert into a value of `value`'s type.
pub(crate) fn text_converts(value: &dyn PartialReflect, text: &str) -> bool {
    let mut probe = value.to_dynamic();
    parse_into_reflect(&mut *probe, text)
}
