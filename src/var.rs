//! Side-stream storage for argument values too large to live in a command.
//!
//! An `ApiCommand` is a small `Copy` value, so anything bulky that a call
//! passes by pointer (texture images, matrices) gets copied into a separate
//! byte stream owned by the command log. The command holds a `Var<Form>`,
//! the byte offset of the value within that stream, tagged with the form it
//! was written in.
//!
//! Values are stored in their native byte order with no alignment padding;
//! deserialization copies them back out a chunk at a time. The side stream
//! never leaves the process, so there is no portable format to worry about.

use std::marker::PhantomData;
use std::{fmt, io};

/// A byte stream that knows its current length.
///
/// Types that implement `Serialize` write themselves to one of these, and
/// report where they started.
pub trait MarkedWrite: io::Write {
    /// Return the current byte offset in the stream. This is the offset at
    /// which the next write will land.
    fn mark(&self) -> usize;
}

impl MarkedWrite for Vec<u8> {
    fn mark(&self) -> usize {
        self.len()
    }
}

/// A value of form `F`, stored at some offset in a side stream.
///
/// The `fn() -> F` phantom keeps `Var` `Send` and `Copy` no matter what `F`
/// is; `F` is only a tag.
pub struct Var<F> {
    offset: usize,
    _form: PhantomData<fn() -> F>,
}

impl<F> Var<F> {
    pub fn new(offset: usize) -> Var<F> {
        Var {
            offset,
            _form: PhantomData,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<F> Clone for Var<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Var<F> {}

impl<F> PartialEq for Var<F> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<F> fmt::Debug for Var<F> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Var({})", self.offset)
    }
}

/// A type that can be written to a side stream.
pub trait Serialize {
    /// The form in which `Self` values are serialized. Deserializing a
    /// `Var<Self::Form>` gets you the value back.
    type Form;

    /// Serialize `self` to `stream`. On success, return the byte offset it was
    /// written to.
    fn serialize<S: MarkedWrite>(&self, stream: &mut S) -> io::Result<usize>;
}

/// A serialized form that can be deserialized to produce a value of type `T`.
///
/// The `'b` lifetime is that of the buffer we deserialize from, for forms
/// that want to borrow from it.
pub trait DeserializeAs<'b, T> {
    /// Extract a value of type `T` from the front of `buf`, and advance `buf`
    /// past the bytes consumed.
    fn deserialize(buf: &mut &'b [u8]) -> Result<T, DeserializeError>;
}

/// Serialize `value` to `stream`, and return a `Var` referring to it.
pub fn put<T, S>(stream: &mut S, value: &T) -> io::Result<Var<T::Form>>
where
    T: Serialize + ?Sized,
    S: MarkedWrite,
{
    Ok(Var::new(value.serialize(stream)?))
}

/// Retrieve the value `var` refers to from the side stream `variable`.
pub fn get<'b, F, T>(var: Var<F>, variable: &'b [u8]) -> Result<T, DeserializeError>
where
    F: DeserializeAs<'b, T>,
{
    let mut buf = variable
        .get(var.offset..)
        .ok_or(DeserializeError::UnexpectedEof)?;
    F::deserialize(&mut buf)
}

/// The serialization form for a 4x4 matrix of `f64` values, as passed to
/// `glLoadMatrixd`.
///
/// This is just the sixteen elements in column-major order.
pub struct MatrixForm;

impl Serialize for [f64; 16] {
    type Form = MatrixForm;
    fn serialize<S: MarkedWrite>(&self, stream: &mut S) -> io::Result<usize> {
        let mark = stream.mark();
        for elt in self {
            stream.write_all(&elt.to_ne_bytes())?;
        }
        Ok(mark)
    }
}

impl<'b> DeserializeAs<'b, [f64; 16]> for MatrixForm {
    fn deserialize(buf: &mut &'b [u8]) -> Result<[f64; 16], DeserializeError> {
        let bytes = take(buf, 16 * std::mem::size_of::<f64>())?;
        let mut matrix = [0.0; 16];
        for (elt, chunk) in matrix.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut raw = [0; 8];
            raw.copy_from_slice(chunk);
            *elt = f64::from_ne_bytes(raw);
        }
        Ok(matrix)
    }
}

/// Split `len` bytes off the front of `buf`.
pub fn take<'b>(buf: &mut &'b [u8], len: usize) -> Result<&'b [u8], DeserializeError> {
    if buf.len() < len {
        return Err(DeserializeError::UnexpectedEof);
    }
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    Ok(head)
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("serialized call argument data truncated")]
    UnexpectedEof,

    #[error("serialized call argument data has a count that overflows")]
    Overflow,

    #[error("serialized pixel data decodes to {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("serialized pixel data has unsupported format/type 0x{format:x}, 0x{pixel_type:x}")]
    UnsupportedFormat { format: u32, pixel_type: u32 },
}

impl From<leb128::read::Error> for DeserializeError {
    fn from(err: leb128::read::Error) -> Self {
        match err {
            leb128::read::Error::IoError(_) => DeserializeError::UnexpectedEof,
            leb128::read::Error::Overflow => DeserializeError::Overflow,
        }
    }
}

#[test]
fn test_matrix() {
    let mut stream = vec![0xee; 3];
    let mut matrix = [0.0; 16];
    matrix[0] = 1.0;
    matrix[5] = -2.5;
    matrix[15] = 1.0e300;

    let var = put(&mut stream, &matrix).expect("writing to a Vec");
    assert_eq!(var.offset(), 3);
    assert_eq!(stream.len(), 3 + 128);

    let back: [f64; 16] = get(var, &stream).expect("matrix should deserialize");
    assert_eq!(back, matrix);

    stream.truncate(100);
    assert!(matches!(
        get::<MatrixForm, [f64; 16]>(var, &stream),
        Err(DeserializeError::UnexpectedEof)
    ));
}
