#![no_main]
use libfuzzer_sys::fuzz_target;

use gl_snapshot::pixels::{Pixels, PixelsForm};
use gl_snapshot::var::{self, Var};

// Arbitrary side-stream bytes must decode cleanly or fail with an error, and
// whatever decodes must survive another trip through the side stream.
fuzz_target!(|data: &[u8]| {
    let pixels: Pixels = match var::get::<PixelsForm, _>(Var::new(0), data) {
        Ok(pixels) => pixels,
        Err(_) => return,
    };

    let mut buf = vec![];
    let var = var::put(&mut buf, &pixels).expect("encoding failed");
    match var::get::<PixelsForm, Pixels>(var, &buf) {
        Ok(again) => assert_eq!(again, pixels),
        Err(e) => panic!("Error: {}", e),
    }
});
