use std::collections::HashMap;

use ttf_layout::{GlyphId, LayoutTable};
use ttf_layout::gsub::Substitutions;
use ttf_layout::parser::Stream;

fn main() {
    let chars: HashMap<GlyphId, char> = (0..128).map(|i| (GlyphId(i), char::from(i as u8))).collect();
    afl::fuzz!(|data: &[u8]| {
        let mut subs = Substitutions::new();
        let _ = LayoutTable::parse(&mut Stream::new(data), 0, &mut subs);
        let _ = subs.resolve_lossy(&chars, &[]);
    });
}
