//! Definition parser fuzz target: feed arbitrary text to the parser, then decode the
//! remaining input with whatever definition it produced.
//! Neither step may panic; both return Ok or Err(BufferError).
//! Build with: cargo fuzz run definition_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (src, rest) = data.split_at(split);
    let s = match std::str::from_utf8(src) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(def) = structbuf::parse_definition(s) {
        let mut buf = structbuf::Buffer::from(rest);
        let _ = buf.read_struct(&structbuf::ReadDefinition::from(def));
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run definition_fuzz");
}
