//! A representation for intercepted OpenGL 1.x calls.
//!
//! The interception layer reports each call as an `ApiFunction` and a slice of
//! `ApiArgument` values. The capturer stores them in its command log as
//! `ApiCommand` values: small, fixed-size, and `Copy`, so a log is just a
//! vector of them plus a side stream for bulky data.

use crate::enums;
use crate::pixels::PixelsForm;
use crate::var::{MatrixForm, Var};

use gleam::gl::GLvoid;
use std::fmt;

/// The kind of value a parameter of an `ApiFunction` takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// A `GLenum`, passed as `ApiArgument::U32`.
    Enum,
    /// A `GLbitfield`, passed as `ApiArgument::U32`.
    Bitfield,
    /// A `GLuint`, passed as `ApiArgument::U32`.
    UInt,
    /// A `GLint` or `GLsizei`, passed as `ApiArgument::I32`.
    Int,
    /// A `GLfloat` or `GLclampf`, passed as `ApiArgument::F32`.
    Float,
    /// A `GLdouble` or `GLclampd`, passed as `ApiArgument::F64`.
    Double,
    /// A `GLubyte` or `GLboolean`, passed as `ApiArgument::U8`.
    UByte,
    /// A pointer, passed as `ApiArgument::Pointer`.
    Pointer,
}

impl ArgKind {
    /// Return true if `arg` is the right variant to pass for this kind.
    pub fn accepts(self, arg: &ApiArgument) -> bool {
        matches!(
            (self, arg),
            (ArgKind::Enum, ApiArgument::U32(_))
                | (ArgKind::Bitfield, ApiArgument::U32(_))
                | (ArgKind::UInt, ApiArgument::U32(_))
                | (ArgKind::Int, ApiArgument::I32(_))
                | (ArgKind::Float, ApiArgument::F32(_))
                | (ArgKind::Double, ApiArgument::F64(_))
                | (ArgKind::UByte, ApiArgument::U8(_))
                | (ArgKind::Pointer, ApiArgument::Pointer(_))
        )
    }
}

macro_rules! api_functions {
    ( $( $variant:ident = $name:literal ( $( $kind:ident ),* ) ),* $(,)? ) => {
        /// An intercepted API entry point.
        ///
        /// Vector forms like `Color3fv` only appear on the interception side;
        /// the capturer rewrites them to their scalar forms before logging.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ApiFunction {
            $( $variant, )*
        }

        impl ApiFunction {
            /// Every function, in declaration order.
            pub const ALL: &'static [ApiFunction] = &[ $( ApiFunction::$variant, )* ];

            /// The C name of the entry point.
            pub fn name(self) -> &'static str {
                match self {
                    $( ApiFunction::$variant => $name, )*
                }
            }

            /// The kinds of the arguments this function takes, in order.
            pub fn signature(self) -> &'static [ArgKind] {
                match self {
                    $( ApiFunction::$variant => &[ $( ArgKind::$kind ),* ], )*
                }
            }
        }
    }
}

#[rustfmt::skip]
api_functions! {
    AlphaFunc = "glAlphaFunc" (Enum, Float),
    Begin = "glBegin" (Enum),
    BindTexture = "glBindTexture" (Enum, UInt),
    BlendFunc = "glBlendFunc" (Enum, Enum),
    Clear = "glClear" (Bitfield),
    ClearColor = "glClearColor" (Float, Float, Float, Float),
    ClearDepth = "glClearDepth" (Double),
    Color3f = "glColor3f" (Float, Float, Float),
    Color3fv = "glColor3fv" (Pointer),
    Color3ub = "glColor3ub" (UByte, UByte, UByte),
    Color3ubv = "glColor3ubv" (Pointer),
    Color4f = "glColor4f" (Float, Float, Float, Float),
    Color4fv = "glColor4fv" (Pointer),
    Color4ub = "glColor4ub" (UByte, UByte, UByte, UByte),
    Color4ubv = "glColor4ubv" (Pointer),
    CullFace = "glCullFace" (Enum),
    DeleteTextures = "glDeleteTextures" (Int, Pointer),
    DepthFunc = "glDepthFunc" (Enum),
    DepthMask = "glDepthMask" (UByte),
    DepthRange = "glDepthRange" (Double, Double),
    Disable = "glDisable" (Enum),
    DrawBuffer = "glDrawBuffer" (Enum),
    Enable = "glEnable" (Enum),
    End = "glEnd" (),
    Finish = "glFinish" (),
    Flush = "glFlush" (),
    FrontFace = "glFrontFace" (Enum),
    Frustum = "glFrustum" (Double, Double, Double, Double, Double, Double),
    GenTextures = "glGenTextures" (Int, Pointer),
    LoadIdentity = "glLoadIdentity" (),
    LoadMatrixd = "glLoadMatrixd" (Pointer),
    MatrixMode = "glMatrixMode" (Enum),
    Ortho = "glOrtho" (Double, Double, Double, Double, Double, Double),
    PopMatrix = "glPopMatrix" (),
    PushMatrix = "glPushMatrix" (),
    ReadPixels = "glReadPixels" (Int, Int, Int, Int, Enum, Enum, Pointer),
    Rotatef = "glRotatef" (Float, Float, Float, Float),
    Scalef = "glScalef" (Float, Float, Float),
    ShadeModel = "glShadeModel" (Enum),
    TexCoord2f = "glTexCoord2f" (Float, Float),
    TexCoord2fv = "glTexCoord2fv" (Pointer),
    TexEnvf = "glTexEnvf" (Enum, Enum, Float),
    TexImage2D = "glTexImage2D" (Enum, Int, Int, Int, Int, Int, Enum, Enum, Pointer),
    TexParameterf = "glTexParameterf" (Enum, Enum, Float),
    TexParameteri = "glTexParameteri" (Enum, Enum, Int),
    Translatef = "glTranslatef" (Float, Float, Float),
    Vertex2f = "glVertex2f" (Float, Float),
    Vertex2fv = "glVertex2fv" (Pointer),
    Vertex3f = "glVertex3f" (Float, Float, Float),
    Vertex3fv = "glVertex3fv" (Pointer),
    Vertex4f = "glVertex4f" (Float, Float, Float, Float),
    Viewport = "glViewport" (Int, Int, Int, Int),
    SwapBuffers = "SwapBuffers" (Pointer),
}

impl ApiFunction {
    /// The first of the OpenGL entry points, in declaration order.
    pub const GL_FIRST: ApiFunction = ApiFunction::AlphaFunc;

    /// The last of the OpenGL entry points. Everything after this is a
    /// window-system call.
    pub const GL_LAST: ApiFunction = ApiFunction::Viewport;

    /// True for OpenGL entry points, false for window-system calls.
    pub fn is_gl(self) -> bool {
        (ApiFunction::GL_FIRST..=ApiFunction::GL_LAST).contains(&self)
    }

    /// For vector forms, return the equivalent scalar function, the kind of
    /// its arguments, and how many elements the vector holds.
    pub fn scalar_form(self) -> Option<(ApiFunction, ArgKind, usize)> {
        use ApiFunction::*;
        Some(match self {
            Color3fv => (Color3f, ArgKind::Float, 3),
            Color3ubv => (Color3ub, ArgKind::UByte, 3),
            Color4fv => (Color4f, ArgKind::Float, 4),
            Color4ubv => (Color4ub, ArgKind::UByte, 4),
            TexCoord2fv => (TexCoord2f, ArgKind::Float, 2),
            Vertex2fv => (Vertex2f, ArgKind::Float, 2),
            Vertex3fv => (Vertex3f, ArgKind::Float, 3),
            _ => return None,
        })
    }
}

/// The address of caller memory passed to an intercepted call.
///
/// The interception layer hands us raw pointers for things like vertex arrays
/// and texture images. They are only valid for the duration of the `on_call`
/// that receives them, so the capturer copies what they point to before
/// returning, and a logged `GlRawPtr` is just a number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlRawPtr {
    addr: usize,
}

impl GlRawPtr {
    /// Wrap a pointer passed to an intercepted call.
    ///
    /// Safety: whenever this `GlRawPtr` is passed to `Capturer::on_call`,
    /// `ptr` must either be null or point to memory that is readable, and
    /// aligned, for as many elements as that function reads through it.
    pub unsafe fn new_unchecked(ptr: *const GLvoid) -> GlRawPtr {
        GlRawPtr { addr: ptr as usize }
    }

    pub fn null() -> GlRawPtr {
        GlRawPtr { addr: 0 }
    }

    pub fn is_null(&self) -> bool {
        self.addr == 0
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    /// Copy `len` values of type `T` out of the caller's memory.
    pub(crate) fn read_vec<T: Copy>(&self, len: usize) -> Vec<T> {
        if len == 0 {
            return Vec::new();
        }
        assert!(
            !self.is_null(),
            "gl-snapshot: null pointer passed where {} values were expected",
            len
        );
        // Safe because of the contract on `new_unchecked`.
        unsafe { std::slice::from_raw_parts(self.addr as *const T, len).to_vec() }
    }
}

/// One argument to an intercepted call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ApiArgument {
    U32(u32),
    I32(i32),
    F32(f32),
    F64(f64),
    U8(u8),
    Pointer(GlRawPtr),

    /// Texture image data, copied into the command log's side stream.
    Pixels(Var<PixelsForm>),

    /// A matrix, copied into the command log's side stream.
    Matrix(Var<MatrixForm>),
}

macro_rules! argument_accessors {
    ( $( $method:ident -> $type:ty = $variant:ident ),* ) => {
        impl ApiArgument {
            $(
                pub fn $method(&self) -> $type {
                    match *self {
                        ApiArgument::$variant(value) => value,
                        other => panic!(
                            "gl-snapshot: expected {} argument, found {:?}",
                            stringify!($variant),
                            other
                        ),
                    }
                }
            )*
        }
    }
}

argument_accessors! {
    as_u32 -> u32 = U32,
    as_i32 -> i32 = I32,
    as_f32 -> f32 = F32,
    as_f64 -> f64 = F64,
    as_u8 -> u8 = U8,
    as_pointer -> GlRawPtr = Pointer,
    as_pixels -> Var<PixelsForm> = Pixels,
    as_matrix -> Var<MatrixForm> = Matrix
}

/// The most arguments any `ApiFunction` takes: `glTexImage2D` has nine.
pub const MAX_ARGS: usize = 9;

/// A logged call: a function and its arguments.
#[derive(Copy, Clone, PartialEq)]
pub struct ApiCommand {
    function: ApiFunction,
    n_args: u8,
    args: [ApiArgument; MAX_ARGS],
}

impl ApiCommand {
    pub fn new(function: ApiFunction, args: &[ApiArgument]) -> ApiCommand {
        assert!(
            args.len() <= MAX_ARGS,
            "gl-snapshot: {} passed {} arguments",
            function.name(),
            args.len()
        );
        let mut stored = [ApiArgument::U32(0); MAX_ARGS];
        stored[..args.len()].copy_from_slice(args);
        ApiCommand {
            function,
            n_args: args.len() as u8,
            args: stored,
        }
    }

    pub fn function(&self) -> ApiFunction {
        self.function
    }

    pub fn args(&self) -> &[ApiArgument] {
        &self.args[..self.n_args as usize]
    }

    /// Return argument `n`, panicking if the function doesn't have that many.
    pub fn arg(&self, n: usize) -> ApiArgument {
        match self.args().get(n) {
            Some(arg) => *arg,
            None => panic!(
                "gl-snapshot: {} has no argument {}",
                self.function.name(),
                n
            ),
        }
    }
}

impl fmt::Debug for ApiCommand {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}{:?}", self.function.name(), self.args())
    }
}

/// Formats a command the way it would appear in C source, with enum values
/// shown by name.
impl fmt::Display for ApiCommand {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}(", self.function.name())?;
        let kinds = self.function.signature();
        for (i, arg) in self.args().iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            match (*arg, kinds.get(i)) {
                (ApiArgument::U32(v), Some(ArgKind::Enum)) => {
                    fmt.write_str(&enums::display(v))?
                }
                (ApiArgument::U32(v), Some(ArgKind::Bitfield)) => {
                    fmt.write_str(&enums::display_bitfield(v))?
                }
                (ApiArgument::U32(v), _) => write!(fmt, "{}", v)?,
                (ApiArgument::I32(v), _) => write!(fmt, "{}", v)?,
                (ApiArgument::F32(v), _) => write!(fmt, "{:?}", v)?,
                (ApiArgument::F64(v), _) => write!(fmt, "{:?}", v)?,
                (ApiArgument::U8(v), _) => write!(fmt, "{}", v)?,
                (ApiArgument::Pointer(p), _) => write!(fmt, "0x{:x}", p.addr())?,
                (ApiArgument::Pixels(var), _) => write!(fmt, "<pixels at {}>", var.offset())?,
                (ApiArgument::Matrix(var), _) => write!(fmt, "<matrix at {}>", var.offset())?,
            }
        }
        fmt.write_str(")")
    }
}

#[test]
fn test_signatures() {
    assert!(ApiFunction::ALL.iter().all(|f| f.signature().len() <= MAX_ARGS));
    assert_eq!(ApiFunction::TexImage2D.signature().len(), MAX_ARGS);

    let gl: Vec<_> = ApiFunction::ALL.iter().filter(|f| f.is_gl()).collect();
    assert_eq!(gl.len(), ApiFunction::ALL.len() - 1);
    assert!(!ApiFunction::SwapBuffers.is_gl());

    for f in ApiFunction::ALL {
        if let Some((scalar, kind, len)) = f.scalar_form() {
            assert_eq!(scalar.signature().len(), len);
            assert!(scalar.signature().iter().all(|k| *k == kind));
        }
    }
}

#[test]
fn test_display() {
    let command = ApiCommand::new(
        ApiFunction::BlendFunc,
        &[
            ApiArgument::U32(enums::ZERO),
            ApiArgument::U32(enums::ONE_MINUS_SRC_COLOR),
        ],
    );
    assert_eq!(
        command.to_string(),
        "glBlendFunc(GL_ZERO, GL_ONE_MINUS_SRC_COLOR)"
    );

    let command = ApiCommand::new(ApiFunction::Vertex2f, &[ApiArgument::F32(1.0), ApiArgument::F32(-0.5)]);
    assert_eq!(command.to_string(), "glVertex2f(1.0, -0.5)");
    assert_eq!(command.args().len(), 2);
}

#[test]
#[should_panic(expected = "expected U32 argument")]
fn test_accessor_mismatch() {
    ApiArgument::F32(1.0).as_u32();
}
