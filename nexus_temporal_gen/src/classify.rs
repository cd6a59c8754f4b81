//! Call shape and execution style of each operation.
//!
//! The (shape × style) space is closed: every combination has one [`Cell`]
//! in [`CELLS`] and the renderers take all of their decisions from it.

use nexus_temporal_types::options::EXECUTION_STYLE;
use nexus_temporal_types::ExecutionStyle;

use crate::error::{Direction, GenerateError};
use crate::service::{FileModel, OperationModel, TypeKind, TypeRef};

/// Presence of a typed input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `Empty -> Empty`
    Empty,
    /// `Empty -> Out`
    OutputOnly,
    /// `In -> Empty`
    InputOnly,
    /// `In -> Out`
    InputOutput,
}

impl Shape {
    pub const ALL: [Shape; 4] = [
        Shape::Empty,
        Shape::OutputOnly,
        Shape::InputOnly,
        Shape::InputOutput,
    ];

    pub fn of(has_input: bool, has_output: bool) -> Self {
        match (has_input, has_output) {
            (false, false) => Shape::Empty,
            (false, true) => Shape::OutputOnly,
            (true, false) => Shape::InputOnly,
            (true, true) => Shape::InputOutput,
        }
    }

    fn index(self) -> usize {
        match self {
            Shape::Empty => 0,
            Shape::OutputOnly => 1,
            Shape::InputOnly => 2,
            Shape::InputOutput => 3,
        }
    }
}

/// Runtime descriptor type a handler accessor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Sync,
    WorkflowRun,
}

impl DescriptorKind {
    /// Name of the runtime type.
    pub fn type_name(self) -> &'static str {
        match self {
            DescriptorKind::Sync => "SyncOperation",
            DescriptorKind::WorkflowRun => "WorkflowRunOperation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub shape: Shape,
    pub style: ExecutionStyle,
    /// Client methods take an `input` parameter
    pub takes_input: bool,
    /// Client methods return a typed output instead of `()`
    pub returns_output: bool,
    pub descriptor: DescriptorKind,
}

const fn make(shape: Shape, style: ExecutionStyle) -> Cell {
    let (takes_input, returns_output) = match shape {
        Shape::Empty => (false, false),
        Shape::OutputOnly => (false, true),
        Shape::InputOnly => (true, false),
        Shape::InputOutput => (true, true),
    };
    let descriptor = match style {
        ExecutionStyle::Direct => DescriptorKind::Sync,
        ExecutionStyle::WorkflowRun => DescriptorKind::WorkflowRun,
    };
    Cell {
        shape,
        style,
        takes_input,
        returns_output,
        descriptor,
    }
}

/// Indexed by `shape * 2 + style`.
pub static CELLS: [Cell; 8] = [
    make(Shape::Empty, ExecutionStyle::Direct),
    make(Shape::Empty, ExecutionStyle::WorkflowRun),
    make(Shape::OutputOnly, ExecutionStyle::Direct),
    make(Shape::OutputOnly, ExecutionStyle::WorkflowRun),
    make(Shape::InputOnly, ExecutionStyle::Direct),
    make(Shape::InputOnly, ExecutionStyle::WorkflowRun),
    make(Shape::InputOutput, ExecutionStyle::Direct),
    make(Shape::InputOutput, ExecutionStyle::WorkflowRun),
];

pub fn cell(shape: Shape, style: ExecutionStyle) -> &'static Cell {
    let style = match style {
        ExecutionStyle::Direct => 0,
        ExecutionStyle::WorkflowRun => 1,
    };
    &CELLS[shape.index() * 2 + style]
}

impl OperationModel {
    pub fn shape(&self) -> Shape {
        Shape::of(self.input.is_some(), self.output.is_some())
    }

    /// Table cell of a classified operation.
    pub fn cell(&self) -> &'static Cell {
        cell(self.shape(), self.execution_style)
    }
}

/// Validates payloads and resolves the execution style of every operation.
pub fn classify_file(mut file: FileModel) -> Result<FileModel, GenerateError> {
    for service in &mut file.services {
        for operation in &mut service.operations {
            classify_operation(&file.path, &service.name, operation)?;
            log::trace!(
                "{}: {}.{} is {:?}/{}",
                file.path,
                service.name,
                operation.name,
                operation.shape(),
                operation.execution_style
            );
        }
    }
    Ok(file)
}

fn classify_operation(
    file: &str,
    service: &str,
    operation: &mut OperationModel,
) -> Result<(), GenerateError> {
    let shape_error = |direction: Direction, found: &str| {
        let type_name = match direction {
            Direction::Input => operation.input_type_name.clone(),
            Direction::Output => operation.output_type_name.clone(),
        };
        GenerateError::InvalidPayloadShape {
            file: file.to_string(),
            service: service.to_string(),
            operation: operation.name.clone(),
            direction,
            type_name,
            found: found.to_string(),
        }
    };

    if operation.client_streaming {
        return Err(shape_error(Direction::Input, "a client stream"));
    }
    if operation.server_streaming {
        return Err(shape_error(Direction::Output, "a server stream"));
    }
    for (direction, payload) in [
        (Direction::Input, &operation.input),
        (Direction::Output, &operation.output),
    ] {
        if let Some(TypeRef { kind, .. }) = payload {
            if *kind != TypeKind::Message {
                return Err(shape_error(direction, kind.describe()));
            }
        }
    }

    let style = match operation.style_tag {
        None => ExecutionStyle::default(),
        Some(tag) => ExecutionStyle::from_tag(tag).map_err(|err| GenerateError::MalformedOption {
            file: file.to_string(),
            location: format!("{service}.{}", operation.name),
            option: EXECUTION_STYLE.full_name(),
            detail: err.to_string(),
        })?,
    };
    operation.execution_style = style;
    Ok(())
}
