//! Scene files: trees of field containers.
//!
//! Text grammar:
//!
//! ```text
//! scene     := container*
//! container := "USE" name
//!            | ["DEF" name] type "{" fields child* "}"
//! ```
//!
//! Only group containers take children. In binary streams a container is
//! its type name, its `DEF` name (empty for none), the field list and, for
//! groups, a child count followed by the children. `USE` is written as the
//! type name `USE` followed by the referenced name.

use std::collections::{HashMap, HashSet};

use coin_common::ReadError;

use crate::catalog::FieldCatalog;
use crate::container::FieldContainer;
use crate::input::Input;
use crate::output::Output;

const COMPONENT: &str = "Input";

struct SceneReader<'a> {
    catalog: &'a FieldCatalog,
    defs: HashMap<String, FieldContainer>,
}

impl SceneReader<'_> {
    fn read_container(&mut self, input: &mut Input) -> Result<FieldContainer, ReadError> {
        let Some(mut keyword) = input.read_name(true) else {
            let got = input.peek_char().map(String::from).unwrap_or_default();
            return Err(input.post_error(COMPONENT, format!("Expected a container type, got '{got}'")));
        };

        if keyword == "USE" {
            let name = input.read_name(false);
            let name = input.require(name, COMPONENT, "USE name")?;
            return match self.defs.get(&name) {
                Some(container) => Ok(container.clone()),
                None => Err(input.post_error(COMPONENT, format!("Unknown reference \"{name}\""))),
            };
        }

        let mut def_name = None;
        if input.is_binary() {
            let name = input.read_name(false);
            let name = input.require(name, COMPONENT, "DEF name")?;
            def_name = Some(name).filter(|n| !n.is_empty());
        } else if keyword == "DEF" {
            let name = input.read_name(false);
            def_name = Some(input.require(name, COMPONENT, "DEF name")?);
            let type_name = input.read_name(true);
            keyword = input.require(type_name, COMPONENT, "container type")?;
        }

        let mut container = match self.catalog.create(&keyword) {
            Some(container) => container,
            None => {
                log::debug!("reading unknown container type \"{keyword}\" as an extension");
                FieldContainer::unknown(&keyword)
            }
        };
        container.set_def_name(def_name);

        if input.is_binary() {
            self.read_binary_body(input, &mut container)?;
        } else {
            self.read_text_body(input, &mut container)?;
        }

        if let Some(name) = container.def_name() {
            let _ = self.defs.insert(name.to_string(), container.clone());
        }
        Ok(container)
    }

    fn read_text_body(&mut self, input: &mut Input, container: &mut FieldContainer) -> Result<(), ReadError> {
        let c = input.expect_char(COMPONENT)?;
        if c != '{' {
            return Err(input.post_error(COMPONENT, format!("Expected '{{', got '{c}'")));
        }

        container.read_fields(input, !container.is_group())?;

        loop {
            let mark = input.mark();
            let c = input.expect_char(COMPONENT)?;
            if c == '}' {
                return Ok(());
            }
            if !container.is_group() {
                return Err(input.post_error(COMPONENT, format!("Expected '}}', got '{c}'")));
            }
            input.rewind(mark);
            let child = self.read_container(input)?;
            container.add_child(child);
        }
    }

    fn read_binary_body(&mut self, input: &mut Input, container: &mut FieldContainer) -> Result<(), ReadError> {
        container.read_fields(input, true)?;
        if !container.is_group() {
            return Ok(());
        }
        let count = input.read_u32();
        let count = input.require(count, COMPONENT, "number of children")?;
        for _ in 0..count {
            let child = self.read_container(input)?;
            container.add_child(child);
        }
        Ok(())
    }
}

/// Read every top-level container of a scene.
///
/// Types missing from `catalog` are read as extension containers whose
/// fields come from their `fields [...]` block.
pub fn read_scene(input: &mut Input, catalog: &FieldCatalog) -> Result<Vec<FieldContainer>, ReadError> {
    let mut reader = SceneReader {
        catalog,
        defs: HashMap::new(),
    };
    let mut roots = Vec::new();
    while !input.at_end() {
        roots.push(reader.read_container(input)?);
    }
    log::debug!("read {} top-level containers", roots.len());
    Ok(roots)
}

/// Read one container, with no `DEF` names visible from earlier reads.
pub fn read_container(input: &mut Input, catalog: &FieldCatalog) -> Result<FieldContainer, ReadError> {
    let mut reader = SceneReader {
        catalog,
        defs: HashMap::new(),
    };
    reader.read_container(input)
}

/// Write a header followed by `roots`.
///
/// The header names VRML 2.0 when `out` was created with
/// [`Output::with_vrml2`].
///
/// A container whose `DEF` name was already written is written as `USE`.
pub fn write_scene(roots: &[FieldContainer], out: &mut Output) {
    out.write_header();
    let mut written = HashSet::new();
    for container in roots {
        write_container(container, out, &mut written);
    }
}

fn write_container(container: &FieldContainer, out: &mut Output, written: &mut HashSet<String>) {
    let binary = out.is_binary();
    if let Some(name) = container.def_name() {
        if !written.insert(name.to_string()) {
            if binary {
                out.write_name("USE");
                out.write_name(name);
            } else {
                out.indent();
                out.write_raw(&format!("USE {name}\n"));
            }
            return;
        }
    }

    if binary {
        out.write_name(container.type_name());
        out.write_name(container.def_name().unwrap_or(""));
        container.write_fields(out);
        if container.is_group() {
            out.write_u32(u32::try_from(container.children().len()).unwrap_or(u32::MAX));
            for child in container.children() {
                write_container(child, out, written);
            }
        }
        return;
    }

    out.indent();
    if let Some(name) = container.def_name() {
        out.write_raw(&format!("DEF {name} "));
    }
    out.write_raw(container.type_name());
    out.write_raw(" {\n");
    out.increment_indent();
    container.write_fields(out);
    for child in container.children() {
        write_container(child, out, written);
    }
    container.write_routes(out);
    out.decrement_indent();
    out.indent();
    out.write_raw("}\n");
}
