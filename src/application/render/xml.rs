//! XML rendering: one `item` element per node, fields as child elements.

use std::io::Write;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::application::render::{render_error, Format};
use crate::application::ApplicationResult;
use crate::domain::{Role, TreeNode};

const DECLARATION: &str = "<?xml version=\"1.0\" ?>\n";
const ROOT: &str = "root";
const ITEM: &str = "item";
const CHILDREN: &str = "children";

pub fn render(forest: &[TreeNode]) -> ApplicationResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    if forest.is_empty() {
        write_empty(&mut writer, ROOT)?;
    } else {
        write_start(&mut writer, ROOT)?;
        for node in forest {
            write_item(&mut writer, node)?;
        }
        write_end(&mut writer, ROOT)?;
    }

    let body = String::from_utf8(writer.into_inner()).map_err(|e| render_error(Format::Xml, e))?;
    Ok(format!("{}{}\n", DECLARATION, body))
}

fn write_item<W: Write>(writer: &mut Writer<W>, node: &TreeNode) -> ApplicationResult<()> {
    write_start(writer, ITEM)?;
    write_field(writer, Role::Label.element_name(), &node.label)?;
    write_field(writer, Role::Id.element_name(), &node.id)?;
    write_field(writer, Role::Link.element_name(), &node.link)?;

    if node.children.is_empty() {
        write_empty(writer, CHILDREN)?;
    } else {
        write_start(writer, CHILDREN)?;
        for child in &node.children {
            write_item(writer, child)?;
        }
        write_end(writer, CHILDREN)?;
    }

    write_end(writer, ITEM)
}

fn write_field<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> ApplicationResult<()> {
    if value.is_empty() {
        return write_empty(writer, name);
    }
    write_start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(partial_escape(value))))
        .map_err(|e| render_error(Format::Xml, e))?;
    write_end(writer, name)
}

fn write_start<W: Write>(writer: &mut Writer<W>, name: &str) -> ApplicationResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| render_error(Format::Xml, e))
}

fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> ApplicationResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| render_error(Format::Xml, e))
}

fn write_empty<W: Write>(writer: &mut Writer<W>, name: &str) -> ApplicationResult<()> {
    writer
        .write_event(Event::Empty(BytesStart::new(name)))
        .map_err(|e| render_error(Format::Xml, e))
}
