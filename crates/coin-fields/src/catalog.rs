//! Container type catalog.
//!
//! A [`ContainerType`] is the shared template of one container type: its
//! [`FieldData`] and a default-valued field set that new instances clone.
//! The [`FieldCatalog`] maps type names to templates. Registration takes
//! the write side of the catalog's lock; lookups share the read side.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use glam::Vec3;

use crate::container::FieldContainer;
use crate::enums::{EnumSet, SFBitMask, SFEnum};
use crate::field::Field;
use crate::field_data::FieldData;
use crate::image::Image;
use crate::multi::{MFColor, MFFloat, MFInt32};
use crate::single::{SFBool, SFColor, SFFloat, SFImage, SFInt32, SFPlane, SFRotation, SFString, SFUShort, SFVec3f};
use crate::value::{Color, Plane};

/// Template of one container type.
#[derive(Debug)]
pub struct ContainerType {
    name: String,
    field_data: Arc<FieldData>,
    defaults: Vec<Box<dyn Field>>,
    is_group: bool,
}

impl ContainerType {
    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared field template.
    pub fn field_data(&self) -> &Arc<FieldData> {
        &self.field_data
    }

    /// True if instances hold child containers.
    pub const fn is_group(&self) -> bool {
        self.is_group
    }

    /// New instance with every field at its default.
    pub fn instantiate(&self) -> FieldContainer {
        FieldContainer::new(
            &self.name,
            Arc::clone(&self.field_data),
            self.defaults.clone(),
            self.is_group,
        )
    }
}

/// Builder for [`ContainerType`].
#[derive(Debug)]
pub struct ContainerTypeBuilder {
    name: String,
    field_data: FieldData,
    defaults: Vec<Box<dyn Field>>,
    is_group: bool,
}

impl ContainerTypeBuilder {
    /// Start a type called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_data: FieldData::new(),
            defaults: Vec::new(),
            is_group: false,
        }
    }

    /// Instances hold child containers.
    #[must_use]
    pub const fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    /// Declare an enumeration table for later enum and bit mask fields.
    #[must_use]
    pub fn define_enum(mut self, enum_type: &str, entries: &[(&str, i32)]) -> Self {
        for (name, value) in entries {
            self.field_data.add_enum_value(enum_type, name, *value);
        }
        self
    }

    /// Add a field with its default value. Adding a name twice keeps the
    /// first field.
    #[must_use]
    pub fn field(mut self, name: &str, default: impl Field + 'static) -> Self {
        let type_name = default.type_name();
        if !self.field_data.has_field(name) {
            let _ = self.field_data.add_field(name, &type_name);
            self.defaults.push(Box::new(default));
        }
        self
    }

    fn enum_set(&self, enum_type: &str) -> EnumSet {
        self.field_data.enum_data(enum_type).cloned().unwrap_or_default()
    }

    /// Add an `SFEnum` field using a table from [`define_enum`](Self::define_enum).
    #[must_use]
    pub fn enum_field(self, name: &str, enum_type: &str, default: i32) -> Self {
        let field = SFEnum::with_enums(self.enum_set(enum_type), default);
        self.field(name, field)
    }

    /// Add an `SFBitMask` field using a table from [`define_enum`](Self::define_enum).
    #[must_use]
    pub fn bitmask_field(self, name: &str, enum_type: &str, default: i32) -> Self {
        let field = SFBitMask::with_enums(self.enum_set(enum_type), default);
        self.field(name, field)
    }

    /// Finish the template.
    pub fn build(self) -> ContainerType {
        ContainerType {
            name: self.name,
            field_data: Arc::new(self.field_data),
            defaults: self.defaults,
            is_group: self.is_group,
        }
    }
}

/// Name to template map shared by every reader.
#[derive(Debug, Default)]
pub struct FieldCatalog {
    types: RwLock<HashMap<String, Arc<ContainerType>>>,
}

impl FieldCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in container types.
    pub fn with_builtins() -> Self {
        let catalog = Self::new();
        for container_type in builtin_types() {
            let _ = catalog.register(container_type);
        }
        catalog
    }

    /// Register a type. If the name is taken the existing template wins and
    /// is returned.
    pub fn register(&self, container_type: ContainerType) -> Arc<ContainerType> {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            types
                .entry(container_type.name.clone())
                .or_insert_with(|| Arc::new(container_type)),
        )
    }

    /// Template for `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<ContainerType>> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(name).cloned()
    }

    /// New default instance of `name`.
    pub fn create(&self, name: &str) -> Option<FieldContainer> {
        self.lookup(name).map(|container_type| container_type.instantiate())
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = types.keys().cloned().collect();
        names.sort();
        names
    }
}

const CACHE_ENABLED: &[(&str, i32)] = &[("OFF", 0), ("ON", 1), ("AUTO", 2)];

fn builtin_types() -> Vec<ContainerType> {
    vec![
        ContainerTypeBuilder::new("Group").group().build(),
        ContainerTypeBuilder::new("Separator")
            .group()
            .define_enum("CacheEnabled", CACHE_ENABLED)
            .enum_field("renderCaching", "CacheEnabled", 2)
            .enum_field("boundingBoxCaching", "CacheEnabled", 2)
            .enum_field("renderCulling", "CacheEnabled", 2)
            .enum_field("pickCulling", "CacheEnabled", 2)
            .build(),
        ContainerTypeBuilder::new("Info")
            .field("string", SFString::with_default("<Undefined info>".to_string()))
            .build(),
        ContainerTypeBuilder::new("Transform")
            .field("translation", SFVec3f::new())
            .field("rotation", SFRotation::new())
            .field("scaleFactor", SFVec3f::with_default(Vec3::ONE))
            .field("scaleOrientation", SFRotation::new())
            .field("center", SFVec3f::new())
            .build(),
        ContainerTypeBuilder::new("DrawStyle")
            .define_enum("Style", &[("FILLED", 0), ("LINES", 1), ("POINTS", 2), ("INVISIBLE", 3)])
            .enum_field("style", "Style", 0)
            .field("pointSize", SFFloat::new())
            .field("lineWidth", SFFloat::new())
            .field("linePattern", SFUShort::with_default(0xffff))
            .field("linePatternScaleFactor", SFInt32::with_default(1))
            .build(),
        ContainerTypeBuilder::new("Complexity")
            .define_enum("Type", &[("OBJECT_SPACE", 0), ("SCREEN_SPACE", 1), ("BOUNDING_BOX", 2)])
            .enum_field("type", "Type", 0)
            .field("value", SFFloat::with_default(0.5))
            .field("textureQuality", SFFloat::with_default(0.5))
            .build(),
        ContainerTypeBuilder::new("ClipPlane")
            .field("plane", SFPlane::with_default(Plane::new(Vec3::X, 0.0)))
            .field("on", SFBool::with_default(true))
            .build(),
        ContainerTypeBuilder::new("PickStyle")
            .define_enum("Style", &[("SHAPE", 0), ("BOUNDING_BOX", 1), ("UNPICKABLE", 2)])
            .enum_field("style", "Style", 0)
            .build(),
        ContainerTypeBuilder::new("LightModel")
            .define_enum("Model", &[("BASE_COLOR", 0), ("PHONG", 1)])
            .enum_field("model", "Model", 1)
            .build(),
        ContainerTypeBuilder::new("ShapeHints")
            .define_enum(
                "VertexOrdering",
                &[("UNKNOWN_ORDERING", 0), ("CLOCKWISE", 1), ("COUNTERCLOCKWISE", 2)],
            )
            .define_enum("ShapeType", &[("UNKNOWN_SHAPE_TYPE", 0), ("SOLID", 1)])
            .define_enum("FaceType", &[("UNKNOWN_FACE_TYPE", 0), ("CONVEX", 1)])
            .enum_field("vertexOrdering", "VertexOrdering", 0)
            .enum_field("shapeType", "ShapeType", 0)
            .enum_field("faceType", "FaceType", 1)
            .field("creaseAngle", SFFloat::new())
            .build(),
        ContainerTypeBuilder::new("LinearProfile")
            .define_enum("Profile", &[("START_FIRST", 0), ("START_NEW", 1), ("ADD_TO_CURRENT", 2)])
            .field("index", MFInt32::with_default(vec![0]))
            .enum_field("linkage", "Profile", 1)
            .build(),
        ContainerTypeBuilder::new("Cylinder")
            .define_enum("Part", &[("SIDES", 1), ("TOP", 2), ("BOTTOM", 4), ("ALL", 7)])
            .bitmask_field("parts", "Part", 7)
            .field("radius", SFFloat::with_default(1.0))
            .field("height", SFFloat::with_default(2.0))
            .build(),
        ContainerTypeBuilder::new("Texture2")
            .define_enum("Wrap", &[("REPEAT", 0), ("CLAMP", 1)])
            .define_enum("Model", &[("MODULATE", 0), ("DECAL", 1), ("BLEND", 2), ("REPLACE", 3)])
            .field("filename", SFString::new())
            .field("image", SFImage::with_default(Image::default()))
            .enum_field("wrapS", "Wrap", 0)
            .enum_field("wrapT", "Wrap", 0)
            .enum_field("model", "Model", 0)
            .field("blendColor", SFColor::new())
            .build(),
        ContainerTypeBuilder::new("Material")
            .field("ambientColor", MFColor::with_default(vec![Color::new(0.2, 0.2, 0.2)]))
            .field("diffuseColor", MFColor::with_default(vec![Color::new(0.8, 0.8, 0.8)]))
            .field("specularColor", MFColor::with_default(vec![Color::new(0.0, 0.0, 0.0)]))
            .field("emissiveColor", MFColor::with_default(vec![Color::new(0.0, 0.0, 0.0)]))
            .field("shininess", MFFloat::with_default(vec![0.2]))
            .field("transparency", MFFloat::with_default(vec![0.0]))
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_share_the_template() {
        let catalog = FieldCatalog::with_builtins();
        let a = catalog.create("Material").unwrap();
        let b = catalog.create("Material").unwrap();
        assert!(Arc::ptr_eq(a.field_data(), b.field_data()));
        assert!(a.is_same(&b));
    }

    #[test]
    fn test_first_registration_wins() {
        let catalog = FieldCatalog::new();
        let first = catalog.register(ContainerTypeBuilder::new("Thing").field("a", SFFloat::new()).build());
        let second = catalog.register(ContainerTypeBuilder::new("Thing").build());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.lookup("Thing").unwrap().field_data().num_fields(), 1);
    }

    #[test]
    fn test_enum_fields_get_their_tables() {
        let catalog = FieldCatalog::with_builtins();
        let mut style = catalog.create("DrawStyle").unwrap();
        style.set("style", "LINES").unwrap();
        assert_eq!(style.field_as::<SFEnum>("style").unwrap().value(), 1);
        assert!(style.set("style", "SPARKLES").is_err());
    }

    #[test]
    fn test_builtin_names() {
        let names = FieldCatalog::with_builtins().type_names();
        for expected in ["Group", "Separator", "Transform", "Material", "Cylinder", "Texture2"] {
            assert!(names.iter().any(|n| n == expected), "{expected} missing");
        }
    }
}
