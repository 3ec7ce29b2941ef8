//! Thin helpers over the native netcdf library.
//!
//! Attribute lookups go through [`has_attr`] first: asking libnetcdf for an
//! attribute that does not exist makes HDF5 print a diagnostic stack even
//! though the miss is handled.

use std::sync::Once;

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn attr_value(var: &netcdf::Variable, name: &str) -> Option<AttributeValue> {
    if !has_attr(var, name) {
        return None;
    }
    var.attribute_value(name)?.ok()
}

/// Numeric attribute as f64. Array attributes yield their first element.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    attr_value(var, name).and_then(|value| numeric_values(value).into_iter().next())
}

/// Two-element numeric attribute such as `valid_range`.
pub(crate) fn get_f64_pair_attr(var: &netcdf::Variable, name: &str) -> Option<(f64, f64)> {
    let values = numeric_values(attr_value(var, name)?);
    match values.as_slice() {
        [lo, hi] => Some((*lo, *hi)),
        _ => None,
    }
}

/// Text attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    match attr_value(var, name)? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut list) if !list.is_empty() => Some(list.swap_remove(0)),
        _ => None,
    }
}

/// Fill value of a variable: its `_FillValue` attribute, else the library
/// default for the variable's type (`NC_FILL_FLOAT` for `float`).
///
/// Byte types have no default fill, matching the usual CF readers.
pub(crate) fn get_fill_value(var: &netcdf::Variable) -> Option<f64> {
    if let Some(fill) = get_f64_attr(var, "_FillValue") {
        return Some(fill);
    }
    match var.vartype() {
        NcVariableType::Float(FloatType::F32) => var.fill_value::<f32>().ok()?.map(f64::from),
        NcVariableType::Float(FloatType::F64) => var.fill_value::<f64>().ok()?,
        NcVariableType::Int(IntType::I16) => var.fill_value::<i16>().ok()?.map(f64::from),
        NcVariableType::Int(IntType::U16) => var.fill_value::<u16>().ok()?.map(f64::from),
        NcVariableType::Int(IntType::I32) => var.fill_value::<i32>().ok()?.map(f64::from),
        NcVariableType::Int(IntType::U32) => var.fill_value::<u32>().ok()?.map(f64::from),
        NcVariableType::Int(IntType::I64) => var.fill_value::<i64>().ok()?.map(|v| v as f64),
        NcVariableType::Int(IntType::U64) => var.fill_value::<u64>().ok()?.map(|v| v as f64),
        _ => None,
    }
}

fn numeric_values(value: AttributeValue) -> Vec<f64> {
    match value {
        AttributeValue::Uchars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Schars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ushorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Uints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ulonglongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Longlongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Doubles(v) => v,
        AttributeValue::Str(_) | AttributeValue::Strs(_) => Vec::new(),
        scalar => f64::try_from(scalar).map(|v| vec![v]).unwrap_or_default(),
    }
}
