#![no_main]
use libfuzzer_sys::fuzz_target;

use gl_snapshot::rle;

fuzz_target!(|data: &[u8]| {
    let (texel_size, data) = match data.split_first() {
        Some((&selector, rest)) => (if selector & 1 == 0 { 1 } else { 4 }, rest),
        None => return,
    };
    let data = &data[..data.len() - data.len() % texel_size];

    let mut buf = vec![];
    rle::write_texels(&mut buf, data, texel_size).expect("encoding failed");
    match rle::read_texels(&buf, texel_size, data.len()) {
        Ok(texels) => assert_eq!(texels, data),
        Err(e) => panic!("Error: {}", e),
    }
});
