//! Field construction by type name, used for `fields [...]` declarations.

use crate::enums::{MFBitMask, MFEnum, SFBitMask, SFEnum};
use crate::field::Field;
use crate::multi::{
    MFBool, MFColor, MFDouble, MFFloat, MFInt32, MFMatrix, MFName, MFPlane, MFRotation, MFShort, MFString, MFTime,
    MFUInt32, MFUShort, MFVec2f, MFVec3d, MFVec3f, MFVec4f,
};
use crate::single::{
    SFBool, SFColor, SFDouble, SFFloat, SFImage, SFInt32, SFMatrix, SFName, SFPlane, SFRotation, SFShort, SFString,
    SFTime, SFUInt32, SFUShort, SFVec2f, SFVec3d, SFVec3f, SFVec4f,
};

/// Every type name [`create_field`] understands.
pub const FIELD_TYPE_NAMES: &[&str] = &[
    "SFBool", "SFInt32", "SFUInt32", "SFShort", "SFUShort", "SFFloat", "SFDouble", "SFTime", "SFString", "SFName",
    "SFVec2f", "SFVec3f", "SFVec4f", "SFVec3d", "SFColor", "SFRotation", "SFPlane", "SFMatrix", "SFImage", "SFEnum",
    "SFBitMask", "MFBool", "MFInt32", "MFUInt32", "MFShort", "MFUShort", "MFFloat", "MFDouble", "MFTime", "MFString",
    "MFName", "MFVec2f", "MFVec3f", "MFVec4f", "MFVec3d", "MFColor", "MFRotation", "MFPlane", "MFMatrix", "MFEnum",
    "MFBitMask",
];

/// A default-valued field of the named type.
pub fn create_field(type_name: &str) -> Option<Box<dyn Field>> {
    let field: Box<dyn Field> = match type_name {
        "SFBool" => Box::new(SFBool::new()),
        "SFInt32" => Box::new(SFInt32::new()),
        "SFUInt32" => Box::new(SFUInt32::new()),
        "SFShort" => Box::new(SFShort::new()),
        "SFUShort" => Box::new(SFUShort::new()),
        "SFFloat" => Box::new(SFFloat::new()),
        "SFDouble" => Box::new(SFDouble::new()),
        "SFTime" => Box::new(SFTime::new()),
        "SFString" => Box::new(SFString::new()),
        "SFName" => Box::new(SFName::new()),
        "SFVec2f" => Box::new(SFVec2f::new()),
        "SFVec3f" => Box::new(SFVec3f::new()),
        "SFVec4f" => Box::new(SFVec4f::new()),
        "SFVec3d" => Box::new(SFVec3d::new()),
        "SFColor" => Box::new(SFColor::new()),
        "SFRotation" => Box::new(SFRotation::new()),
        "SFPlane" => Box::new(SFPlane::new()),
        "SFMatrix" => Box::new(SFMatrix::new()),
        "SFImage" => Box::new(SFImage::new()),
        "SFEnum" => Box::new(SFEnum::default()),
        "SFBitMask" => Box::new(SFBitMask::default()),
        "MFBool" => Box::new(MFBool::new()),
        "MFInt32" => Box::new(MFInt32::new()),
        "MFUInt32" => Box::new(MFUInt32::new()),
        "MFShort" => Box::new(MFShort::new()),
        "MFUShort" => Box::new(MFUShort::new()),
        "MFFloat" => Box::new(MFFloat::new()),
        "MFDouble" => Box::new(MFDouble::new()),
        "MFTime" => Box::new(MFTime::new()),
        "MFString" => Box::new(MFString::new()),
        "MFName" => Box::new(MFName::new()),
        "MFVec2f" => Box::new(MFVec2f::new()),
        "MFVec3f" => Box::new(MFVec3f::new()),
        "MFVec4f" => Box::new(MFVec4f::new()),
        "MFVec3d" => Box::new(MFVec3d::new()),
        "MFColor" => Box::new(MFColor::new()),
        "MFRotation" => Box::new(MFRotation::new()),
        "MFPlane" => Box::new(MFPlane::new()),
        "MFMatrix" => Box::new(MFMatrix::new()),
        "MFEnum" => Box::new(MFEnum::default()),
        "MFBitMask" => Box::new(MFBitMask::default()),
        _ => return None,
    };
    Some(field)
}
