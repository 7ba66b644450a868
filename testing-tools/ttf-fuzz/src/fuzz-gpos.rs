fn main() {
    afl::fuzz!(|data: &[u8]| {
        if let Ok(table) = ttf_layout::gpos::Table::parse(&mut ttf_layout::parser::Stream::new(data), 0) {
            let _ = table.positions.placements();
            let _ = table.positions.attachments();
        }
    });
}
