//! The ordered list of commands captured for one frame.

use crate::call::{ApiArgument, ApiCommand, ApiFunction};
use crate::pixels::{Pixels, PixelsForm};
use crate::var::{self, MatrixForm, Var};

/// A frame's commands, plus the side stream holding their bulky arguments.
///
/// Command indices are stable: the analyzer's pass ranges and the player's
/// command mask both refer to commands by their position here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandLog {
    commands: Vec<ApiCommand>,
    variable: Vec<u8>,
}

impl CommandLog {
    pub fn new() -> CommandLog {
        CommandLog::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[ApiCommand] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&ApiCommand> {
        self.commands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApiCommand> {
        self.commands.iter()
    }

    /// The side stream that `Var` arguments point into.
    pub fn variable(&self) -> &[u8] {
        &self.variable
    }

    /// Append a command, and return its index.
    pub fn push(&mut self, function: ApiFunction, args: &[ApiArgument]) -> usize {
        self.commands.push(ApiCommand::new(function, args));
        self.commands.len() - 1
    }

    /// Copy `pixels` into the side stream.
    pub fn put_pixels(&mut self, pixels: &Pixels) -> Var<PixelsForm> {
        var::put(&mut self.variable, pixels).expect("gl-snapshot: writing to a Vec can't fail")
    }

    /// Copy `matrix` into the side stream.
    pub fn put_matrix(&mut self, matrix: &[f64; 16]) -> Var<MatrixForm> {
        var::put(&mut self.variable, matrix).expect("gl-snapshot: writing to a Vec can't fail")
    }

    /// Retrieve pixels stored with `put_pixels`.
    pub fn pixels(&self, var: Var<PixelsForm>) -> Pixels<'static> {
        var::get(var, &self.variable).expect("gl-snapshot: deserializing pixels argument failed")
    }

    /// Retrieve a matrix stored with `put_matrix`.
    pub fn matrix(&self, var: Var<MatrixForm>) -> [f64; 16] {
        var::get(var, &self.variable).expect("gl-snapshot: deserializing matrix argument failed")
    }

    /// Return the index and command of the first call to `function`.
    pub fn find(&self, function: ApiFunction) -> Option<(usize, &ApiCommand)> {
        self.commands
            .iter()
            .enumerate()
            .find(|(_, command)| command.function() == function)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.variable.clear();
    }
}

impl<'a> IntoIterator for &'a CommandLog {
    type Item = &'a ApiCommand;
    type IntoIter = std::slice::Iter<'a, ApiCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[test]
fn test_side_stream() {
    use crate::enums;

    let mut log = CommandLog::new();
    let mut matrix = [0.0; 16];
    matrix[3] = 7.0;
    let m = log.put_matrix(&matrix);
    log.push(ApiFunction::LoadMatrixd, &[ApiArgument::Matrix(m)]);

    let pixels = Pixels::new(2, 1, enums::RGBA, enums::UNSIGNED_BYTE, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    let p = log.put_pixels(&pixels);
    let index = log.push(ApiFunction::Begin, &[ApiArgument::U32(enums::QUADS)]);

    assert_eq!(index, 1);
    assert_eq!(log.matrix(log.get(0).unwrap().arg(0).as_matrix()), matrix);
    assert_eq!(log.pixels(p), pixels);
    assert_eq!(log.find(ApiFunction::Begin).map(|(i, _)| i), Some(1));
    assert!(log.find(ApiFunction::End).is_none());
}
