//! XML serialization of the generated output tree, with the supported
//! document framings.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use yangsmith_generate::OutputNode;

use crate::CliError;

const CONFIG_NS: &str = "http://tail-f.com/ns/config/1.0";
const NCS_NS: &str = "http://tail-f.com/ns/ncs";

/// How the generated tree is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Bare `<root>` element.
    Default,
    /// `<config>` in the tailf config namespace.
    TailfConfig,
    /// NSO device tree: `config/devices/device/<name>/config`.
    NsoDevice,
}

/// Serialize `generated` (its children, not the synthetic root itself)
/// under the requested framing.
pub fn serialize(
    generated: &OutputNode,
    format: OutputFormat,
    device_name: &str,
) -> Result<String, CliError> {
    let document = frame(generated, format, device_name);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    render(writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None))))?;
    write_node(&mut writer, &document)?;
    String::from_utf8(writer.into_inner())
        .map_err(|err| CliError::Render(err.to_string()))
}

fn frame(generated: &OutputNode, format: OutputFormat, device_name: &str) -> OutputNode {
    let mut contents = generated.clone();
    match format {
        OutputFormat::Default => {
            contents.name = "root".to_string();
            contents.namespace = None;
            contents
        }
        OutputFormat::TailfConfig => {
            contents.name = "config".to_string();
            contents.namespace = Some(CONFIG_NS.to_string());
            contents
        }
        OutputFormat::NsoDevice => {
            contents.name = "config".to_string();
            contents.namespace = Some(NCS_NS.to_string());
            let mut device = OutputNode::root("device");
            device.children.push(OutputNode {
                name: "name".to_string(),
                namespace: None,
                text: Some(device_name.to_string()),
                children: Vec::new(),
            });
            device.children.push(contents);
            let mut devices = OutputNode::root("devices");
            devices.namespace = Some(NCS_NS.to_string());
            devices.children.push(device);
            let mut root = OutputNode::root("config");
            root.namespace = Some(CONFIG_NS.to_string());
            root.children.push(devices);
            root
        }
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &OutputNode) -> Result<(), CliError> {
    let mut start = BytesStart::new(node.name.as_str());
    if let Some(namespace) = &node.namespace {
        start.push_attribute(("xmlns", namespace.as_str()));
    }
    if node.children.is_empty() && node.text.is_none() {
        return render(writer.write_event(Event::Empty(start)));
    }
    render(writer.write_event(Event::Start(start)))?;
    if let Some(text) = &node.text {
        // Leaf text was escaped at generation time.
        render(writer.write_event(Event::Text(BytesText::from_escaped(text.as_str()))))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    render(writer.write_event(Event::End(BytesEnd::new(node.name.as_str()))))
}

fn render<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<T, CliError> {
    result.map_err(|err| CliError::Render(err.to_string()))
}
