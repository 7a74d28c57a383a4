//! Statements of the generated form program.
//!
//! Fields and the emitter describe what the generated code does with these
//! values; a writer in `formc-codegen` decides how they look as text. Keeping
//! the two apart lets the structure be tested without comparing strings.

/// An argument of a widget construction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A string literal; the writer escapes it.
    Str(String),
    Int(i64),
    /// The form object itself.
    Form,
    /// A member of the form object, by name.
    FormMember(String),
    /// `key=<arg>`
    Keyword(String, Box<Arg>),
}

/// The expression that constructs a field's widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetExpr {
    Call { callee: String, args: Vec<Arg> },
    /// A constructor expression supplied verbatim by a rule, e.g. `BIntEdit()`.
    Verbatim(String),
}

impl WidgetExpr {
    pub fn call(callee: &str, args: Vec<Arg>) -> Self {
        WidgetExpr::Call {
            callee: callee.to_string(),
            args,
        }
    }
}

/// One statement of the generated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Bind a new widget to the form member `name`.
    Construct { name: String, expr: WidgetExpr },
    /// Populate a combo box with fixed items, in order.
    AddItems { name: String, items: Vec<String> },
    /// Record the widget in the form's field registry under `name`.
    Register { name: String },
    /// The section's row content is the single widget `name`.
    UseWidget { name: String },
    /// Start a captioned group holding several widgets.
    OpenGroup,
    /// Place widget `name` in the open group at a grid position.
    PlaceInGroup { name: String, row: usize, col: usize },
    /// Finish the open group.
    CloseGroup,
    /// Add the current row content to the form under a caption. Each label
    /// line is one caption line.
    AddRow { caption: Vec<String> },
    /// Flag the row just added as filled automatically from an input file.
    MarkAutomatic,
}
