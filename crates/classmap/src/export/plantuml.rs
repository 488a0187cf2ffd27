//! PlantUML output.
//!
//! [`PlantUmlWriter`] knows the text format: quoting, two-space indentation,
//! and matched `/' @classmap:begin ... '/` and `/' @classmap:end ... '/`
//! markers on every block. [`PlantUmlSink`] turns the statement stream into
//! calls on the writer.

use std::{
    collections::HashMap,
    io::{self, Write},
};

use log::{debug, trace};

use classmap_core::{
    declaration::{TypeKind, Visibility},
    fqn::Fqn,
};

use super::DiagramSink;
use crate::{
    config::DiagramConfig,
    resolve::Relationship,
    statement::{Declaration, Member},
};

const INDENT: &str = "  ";
const MARKER: &str = "@classmap";

/// Low-level PlantUML block writer.
///
/// Blocks are closed in reverse opening order; [`end_block`](Self::end_block)
/// always closes the innermost one.
///
/// # Examples
///
/// ```
/// use classmap::export::plantuml::PlantUmlWriter;
///
/// let mut writer = PlantUmlWriter::new(Vec::new());
/// writer.begin_diagram("D").unwrap();
/// writer.begin_block("package", "P", &[]).unwrap();
/// writer.end_block().unwrap();
/// writer.end_diagram().unwrap();
///
/// let text = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(
///     text,
///     "@startuml\n\
///      title D\n\
///      package \"P\" { /' @classmap:begin package \"P\" '/\n\
///      } /' @classmap:end package \"P\" '/\n\
///      @enduml\n"
/// );
/// ```
#[derive(Debug)]
pub struct PlantUmlWriter<W: Write> {
    out: W,
    open: Vec<(String, String)>,
}

impl<W: Write> PlantUmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            open: Vec::new(),
        }
    }

    /// Starts the diagram and writes a visible `title` line unless `title`
    /// is blank.
    pub fn begin_diagram(&mut self, title: &str) -> io::Result<()> {
        self.line("@startuml")?;
        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }
        self.line(&format!("title {}", title.replace(['\r', '\n'], " ")))
    }

    /// Closes every open block and ends the diagram.
    pub fn end_diagram(&mut self) -> io::Result<()> {
        while !self.open.is_empty() {
            self.end_block()?;
        }
        self.line("@enduml")
    }

    /// Writes `text` at the current indentation. Empty text yields an empty line.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        if !text.is_empty() {
            for _ in 0..self.open.len() {
                self.out.write_all(INDENT.as_bytes())?;
            }
            self.out.write_all(text.as_bytes())?;
        }
        self.out.write_all(b"\n")
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        self.line("")
    }

    /// Opens a `keyword "name"` block, optionally tagged with stereotypes.
    pub fn begin_block(
        &mut self,
        keyword: &str,
        name: &str,
        stereotypes: &[String],
    ) -> io::Result<()> {
        let name = quote(name);
        self.line(&format!(
            "{keyword} {name}{} {{ /' {MARKER}:begin {keyword} {name} '/",
            render_stereotypes(stereotypes)
        ))?;
        self.open.push((keyword.to_string(), name));
        Ok(())
    }

    /// Closes the innermost open block.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] if no block is open.
    pub fn end_block(&mut self) -> io::Result<()> {
        let Some((keyword, name)) = self.open.pop() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no open PlantUML block to close",
            ));
        };
        self.line(&format!("}} /' {MARKER}:end {keyword} {name} '/"))
    }

    /// Writes `"left" arrow "right"` with an optional `: label`.
    pub fn connect(
        &mut self,
        left: &str,
        arrow: &str,
        right: &str,
        label: Option<&str>,
    ) -> io::Result<()> {
        let mut text = format!("{} {arrow} {}", quote(left), quote(right));
        if let Some(label) = label.filter(|label| !label.is_empty()) {
            text.push_str(" : ");
            text.push_str(label);
        }
        self.line(&text)
    }

    /// Writes a `footer ... end footer` block.
    pub fn footer(&mut self, text: &str) -> io::Result<()> {
        self.line("footer")?;
        self.line(text)?;
        self.line("end footer")
    }

    /// Returns the number of open blocks.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Declaring,
    Relating,
    Finished,
}

/// A [`DiagramSink`] producing a PlantUML class diagram.
///
/// Declarations of one package are wrapped in a `package` block; types of the
/// unnamed package are written at the top level. The open package is closed
/// before the first relationship.
#[derive(Debug)]
pub struct PlantUmlSink<W: Write> {
    writer: PlantUmlWriter<W>,
    config: DiagramConfig,
    rendered_names: HashMap<Fqn, String>,
    package: Option<String>,
    phase: Phase,
}

impl<W: Write> PlantUmlSink<W> {
    pub fn new(out: W, config: &DiagramConfig) -> Self {
        Self {
            writer: PlantUmlWriter::new(out),
            config: config.clone(),
            rendered_names: HashMap::new(),
            package: None,
            phase: Phase::Idle,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn start(&mut self) -> io::Result<()> {
        if self.phase != Phase::Idle {
            return Ok(());
        }
        self.phase = Phase::Declaring;
        self.writer.begin_diagram(self.config.title())?;
        if self.config.hide_empty_members() {
            self.writer.line("hide empty members")?;
        }
        if let Some(theme) = self.config.theme() {
            self.writer.line(&format!("!theme {theme}"))?;
        }
        Ok(())
    }

    fn close_package(&mut self) -> io::Result<()> {
        if self.package.take().is_some_and(|package| !package.is_empty()) {
            self.writer.end_block()?;
        }
        Ok(())
    }

    fn enter_package(&mut self, package: &str) -> io::Result<()> {
        if self.package.as_deref() == Some(package) {
            return Ok(());
        }
        self.close_package()?;
        self.writer.blank_line()?;
        if !package.is_empty() {
            self.writer.begin_block("package", package, &[])?;
        }
        self.package = Some(package.to_string());
        Ok(())
    }

    fn write_member(&mut self, member: &Member) -> io::Result<()> {
        let text = match member {
            Member::Field {
                name,
                type_name,
                visibility,
                is_static,
                is_final,
                is_transient,
                is_volatile,
            } => {
                let mut text = String::new();
                let flags = [
                    (*is_static, "{static} "),
                    (*is_final, "{final} "),
                    (*is_transient, "{transient} "),
                    (*is_volatile, "{volatile} "),
                ];
                for (set, flag) in flags {
                    if set {
                        text.push_str(flag);
                    }
                }
                text.push(visibility_symbol(*visibility));
                text.push_str(&format!("{name} : {type_name}"));
                text
            }
            Member::Component { name, type_name } => format!("{name} : {type_name}"),
            Member::Constant { name } => name.clone(),
        };
        self.writer.line(&text)
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.phase == Phase::Finished {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "PlantUML sink already finished",
            ));
        }
        Ok(())
    }
}

impl<W: Write> DiagramSink for PlantUmlSink<W> {
    fn declare(&mut self, declaration: &Declaration) -> io::Result<()> {
        self.ensure_open()?;
        if self.phase == Phase::Relating {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{}` declared after the first relationship", declaration.fqn),
            ));
        }
        self.start()?;
        self.enter_package(&declaration.package)?;

        let keyword = if declaration.is_abstract && declaration.kind == TypeKind::Class {
            "abstract class"
        } else {
            declaration.kind.keyword()
        };
        trace!(fqn = declaration.fqn.as_str(), keyword = keyword; "Declaring type");

        self.writer
            .begin_block(keyword, &declaration.rendered_name, &declaration.stereotypes)?;
        if self.config.show_members() {
            for member in &declaration.members {
                self.write_member(member)?;
            }
        }
        self.writer.end_block()?;

        self.rendered_names
            .insert(declaration.fqn.clone(), declaration.rendered_name.clone());
        Ok(())
    }

    fn relate(&mut self, relationship: &Relationship) -> io::Result<()> {
        self.ensure_open()?;
        self.start()?;
        if self.phase != Phase::Relating {
            self.close_package()?;
            self.writer.blank_line()?;
            self.phase = Phase::Relating;
        }

        let (left, right) = relationship.ends();
        let left = self.rendered_name(left);
        let right = self.rendered_name(right);

        let mut label = relationship.role().unwrap_or_default().to_string();
        let stereotypes = render_stereotypes(relationship.stereotypes());
        if !stereotypes.is_empty() {
            label.push_str(&stereotypes);
        }
        let label = label.trim();

        self.writer
            .connect(&left, relationship.kind().arrow(), &right, Some(label))
    }

    fn finish(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.start()?;
        self.close_package()?;
        self.writer.blank_line()?;
        self.writer.line(self.config.direction().directive())?;
        if self.config.footer() {
            self.writer.blank_line()?;
            self.writer.footer("Generated with classmap")?;
        }
        self.writer.end_diagram()?;
        self.writer.flush()?;
        self.phase = Phase::Finished;

        debug!(types = self.rendered_names.len(); "PlantUML diagram written");
        Ok(())
    }
}

impl<W: Write> PlantUmlSink<W> {
    fn rendered_name(&self, fqn: &Fqn) -> String {
        self.rendered_names
            .get(fqn)
            .cloned()
            .unwrap_or_else(|| fqn.to_string())
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "'"))
}

fn render_stereotypes(stereotypes: &[String]) -> String {
    stereotypes
        .iter()
        .map(|stereotype| format!(" <<{stereotype}>>"))
        .collect()
}

fn visibility_symbol(visibility: Visibility) -> char {
    match visibility {
        Visibility::Public => '+',
        Visibility::Protected => '#',
        Visibility::Package => '~',
        Visibility::Private => '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Direction, resolve::RelationKind};

    fn declaration(fqn: &str, package: &str, kind: TypeKind) -> Declaration {
        Declaration {
            fqn: Fqn::from(fqn),
            package: package.to_string(),
            kind,
            rendered_name: fqn.to_string(),
            is_abstract: false,
            stereotypes: Vec::new(),
            members: Vec::new(),
        }
    }

    fn render(
        config: &DiagramConfig,
        run: impl FnOnce(&mut PlantUmlSink<Vec<u8>>) -> io::Result<()>,
    ) -> String {
        let mut sink = PlantUmlSink::new(Vec::new(), config);
        run(&mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_writer_nests_and_indents() {
        let mut writer = PlantUmlWriter::new(Vec::new());
        writer.begin_diagram("D").unwrap();
        writer.begin_block("package", "P", &[]).unwrap();
        writer
            .begin_block("class", "A", &["Entity".to_string()])
            .unwrap();
        writer.line("-id : long").unwrap();
        assert_eq!(writer.depth(), 2);
        writer.end_diagram().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            concat!(
                "@startuml\n",
                "title D\n",
                "package \"P\" { /' @classmap:begin package \"P\" '/\n",
                "  class \"A\" <<Entity>> { /' @classmap:begin class \"A\" '/\n",
                "    -id : long\n",
                "  } /' @classmap:end class \"A\" '/\n",
                "} /' @classmap:end package \"P\" '/\n",
                "@enduml\n",
            )
        );
    }

    #[test]
    fn test_writer_rejects_unbalanced_end() {
        let mut writer = PlantUmlWriter::new(Vec::new());
        let err = writer.end_block().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_writer_connect() {
        let mut writer = PlantUmlWriter::new(Vec::new());
        writer.connect("O", "-->", "T", Some("role")).unwrap();
        writer.connect("T", "<|--", "S", None).unwrap();
        writer.connect("T", "<|..", "S", Some("")).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "\"O\" --> \"T\" : role\n\"T\" <|-- \"S\"\n\"T\" <|.. \"S\"\n"
        );
    }

    #[test]
    fn test_sink_full_document() {
        let config = DiagramConfig::default().with_title("Shop").with_theme("blueprint");
        let text = render(&config, |sink| {
            sink.declare(&declaration("pa.A", "pa", TypeKind::Interface))?;
            sink.declare(&declaration("pb.B", "pb", TypeKind::Class))?;
            sink.relate(&Relationship::new(
                Fqn::from("pb.B"),
                Fqn::from("pa.A"),
                RelationKind::Implements,
            ))?;
            sink.finish()
        });

        assert_eq!(
            text,
            concat!(
                "@startuml\n",
                "title Shop\n",
                "hide empty members\n",
                "!theme blueprint\n",
                "\n",
                "package \"pa\" { /' @classmap:begin package \"pa\" '/\n",
                "  interface \"pa.A\" { /' @classmap:begin interface \"pa.A\" '/\n",
                "  } /' @classmap:end interface \"pa.A\" '/\n",
                "} /' @classmap:end package \"pa\" '/\n",
                "\n",
                "package \"pb\" { /' @classmap:begin package \"pb\" '/\n",
                "  class \"pb.B\" { /' @classmap:begin class \"pb.B\" '/\n",
                "  } /' @classmap:end class \"pb.B\" '/\n",
                "} /' @classmap:end package \"pb\" '/\n",
                "\n",
                "\"pa.A\" <|.. \"pb.B\"\n",
                "\n",
                "left to right direction\n",
                "\n",
                "footer\n",
                "Generated with classmap\n",
                "end footer\n",
                "@enduml\n",
            )
        );
    }

    #[test]
    fn test_sink_unnamed_package_is_not_wrapped() {
        let config = DiagramConfig::default().with_footer(false);
        let text = render(&config, |sink| {
            sink.declare(&declaration("Main", "", TypeKind::Class))?;
            sink.finish()
        });

        assert!(!text.contains("package"));
        assert!(text.contains("\nclass \"Main\" { /' @classmap:begin class \"Main\" '/\n"));
        assert!(!text.contains("footer"));
    }

    #[test]
    fn test_sink_members_and_abstract() {
        let mut shape = declaration("p.Shape", "p", TypeKind::Class);
        shape.is_abstract = true;
        shape.stereotypes = vec!["Entity".to_string()];
        shape.members = vec![
            Member::Field {
                name: "counter".to_string(),
                type_name: "int".to_string(),
                visibility: Visibility::Private,
                is_static: true,
                is_final: true,
                is_transient: false,
                is_volatile: false,
            },
            Member::Field {
                name: "name".to_string(),
                type_name: "String".to_string(),
                visibility: Visibility::Public,
                is_static: false,
                is_final: false,
                is_transient: true,
                is_volatile: false,
            },
        ];
        let mut status = declaration("p.Status", "p", TypeKind::Enum);
        status.members = vec![Member::Constant {
            name: "OPEN".to_string(),
        }];
        let mut line = declaration("p.Line", "p", TypeKind::Record);
        line.members = vec![Member::Component {
            name: "qty".to_string(),
            type_name: "int".to_string(),
        }];

        let text = render(&DiagramConfig::default(), |sink| {
            sink.declare(&line)?;
            sink.declare(&shape)?;
            sink.declare(&status)?;
            sink.finish()
        });

        assert!(text.contains(
            "  abstract class \"p.Shape\" <<Entity>> { /' @classmap:begin abstract class \"p.Shape\" '/\n"
        ));
        assert!(text.contains("    {static} {final} -counter : int\n"));
        assert!(text.contains("    {transient} +name : String\n"));
        assert!(text.contains("    OPEN\n"));
        assert!(text.contains("    qty : int\n"));
        assert_eq!(text.matches("package \"p\" {").count(), 1);

        let hidden = render(&DiagramConfig::default().with_members(false), |sink| {
            sink.declare(&shape)?;
            sink.finish()
        });
        assert!(!hidden.contains("counter"));
    }

    #[test]
    fn test_sink_association_label_and_rendered_names() {
        let mut inner = declaration("p.Outer.Inner", "p", TypeKind::Class);
        inner.rendered_name = "p.Outer_Inner".to_string();
        let config = DiagramConfig::default().with_direction(Direction::TopToBottom);

        let text = render(&config, |sink| {
            sink.declare(&declaration("p.Outer", "p", TypeKind::Class))?;
            sink.declare(&inner)?;
            sink.relate(&Relationship::new(
                Fqn::from("p.Outer"),
                Fqn::from("p.Outer.Inner"),
                RelationKind::Owns,
            ))?;
            sink.relate(
                &Relationship::new(
                    Fqn::from("p.Outer"),
                    Fqn::from("p.Outer.Inner"),
                    RelationKind::Associates,
                )
                .with_role("inner")
                .with_stereotypes(vec!["OneToMany".to_string()]),
            )?;
            sink.finish()
        });

        assert!(text.contains("\n\"p.Outer\" +-- \"p.Outer_Inner\"\n"));
        assert!(text.contains("\n\"p.Outer\" --> \"p.Outer_Inner\" : inner <<OneToMany>>\n"));
        assert!(text.contains("\ntop to bottom direction\n"));
    }

    #[test]
    fn test_sink_rejects_out_of_order_calls() {
        let mut sink = PlantUmlSink::new(Vec::new(), &DiagramConfig::default());
        sink.declare(&declaration("p.A", "p", TypeKind::Class)).unwrap();
        sink.relate(&Relationship::new(
            Fqn::from("p.A"),
            Fqn::from("p.A"),
            RelationKind::Owns,
        ))
        .unwrap();

        let err = sink
            .declare(&declaration("p.B", "p", TypeKind::Class))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        sink.finish().unwrap();
        assert!(sink.finish().is_err());
    }

    #[test]
    fn test_blank_title_is_omitted() {
        let mut writer = PlantUmlWriter::new(Vec::new());
        writer.begin_diagram("  ").unwrap();
        writer.begin_diagram("Two\nlines").unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "@startuml\n@startuml\ntitle Two lines\n");
    }

    #[test]
    fn test_empty_diagram_is_well_formed() {
        let text = render(&DiagramConfig::default().with_footer(false), |sink| sink.finish());
        assert_eq!(
            text,
            "@startuml\ntitle classmap\nhide empty members\n\nleft to right direction\n@enduml\n"
        );
    }
}
