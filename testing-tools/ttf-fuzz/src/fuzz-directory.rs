use ttf_layout::{gpos, gsub};
use ttf_layout::directory::Directory;
use ttf_layout::parser::Stream;

fn main() {
    afl::fuzz!(|data: &[u8]| {
        let mut s = Stream::new(data);
        if let Ok(dir) = Directory::parse(&mut s, 0) {
            if let Some(record) = dir.find(gsub::TAG) {
                let _ = gsub::Table::parse(&mut s, record.offset);
            }

            if let Some(record) = dir.find(gpos::TAG) {
                let _ = gpos::Table::parse(&mut s, record.offset);
            }
        }
    });
}
