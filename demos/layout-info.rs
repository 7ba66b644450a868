use ttf_layout::{gpos, gsub, LayoutTable, Warning};
use ttf_layout::directory::{fonts_in_collection, Directory};
use ttf_layout::parser::IoCursor;

const HELP: &str = "\
Usage:
    layout-info [OPTIONS] FONT

Options:
    --index N   A font index in a TrueType Collection [default: 0]
    -h, --help  Prints this help
";

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }

    let index: u32 = args.opt_value_from_str("--index")?.unwrap_or(0);
    let path: std::path::PathBuf = match args.opt_free_from_str()? {
        Some(path) => path,
        None => {
            print!("{}", HELP);
            std::process::exit(1);
        }
    };

    let file = std::fs::File::open(&path)?;
    let mut s = IoCursor::new(std::io::BufReader::new(file));

    if let Some(count) = fonts_in_collection(&mut s)? {
        println!("Fonts in collection: {}", count);
    }

    let dir = Directory::parse(&mut s, index)?;
    println!("Tables: {}", dir.tables.len());

    match dir.find(gsub::TAG) {
        Some(record) => match gsub::Table::parse(&mut s, record.offset) {
            Ok(table) => {
                print_layout("GSUB", &table.layout);
                println!("  Composite glyphs: {}", table.substitutions.raw_map().len());
                print_warnings(table.substitutions.warnings());
            }
            Err(e) => println!("GSUB: {}", e),
        },
        None => println!("GSUB: none"),
    }

    match dir.find(gpos::TAG) {
        Some(record) => match gpos::Table::parse(&mut s, record.offset) {
            Ok(table) => {
                print_layout("GPOS", &table.layout);
                let positions = &table.positions;
                println!("  Adjusted glyphs: {}", positions.adjustments().len());
                println!("  Mark anchors: {}", positions.mark_anchors().len());
                println!("  Base anchors: {}", positions.base_anchors().len());
                println!("  Chaining rules: {}", positions.chain_rules().len());
                print_warnings(positions.warnings());
            }
            Err(e) => println!("GPOS: {}", e),
        },
        None => println!("GPOS: none"),
    }

    Ok(())
}

fn print_layout(name: &str, table: &LayoutTable) {
    println!("{}:", name);

    let version = table.header.version;
    println!("  Version: {}.{}", version >> 16, version & 0xFFFF);

    match table.supported_language() {
        Ok(language) => println!("  Language: {:?}", language),
        Err(e) => println!("  Language: {}", e),
    }

    for script in &table.scripts {
        let langs: Vec<_> = script.lang_systems.iter()
            .filter_map(|lang_sys| lang_sys.tag)
            .map(|tag| tag.to_string())
            .collect();
        println!("  Script {} [{}]", script.tag, langs.join(", "));
    }

    for feature in &table.features {
        println!("  Feature {} -> {:?}", feature.tag, feature.lookup_indices);
    }

    for (index, lookup) in table.lookups.iter().enumerate() {
        println!(
            "  Lookup {}: type {}, {} subtables",
            index, lookup.lookup_type, lookup.subtable_offsets.len()
        );
    }
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        println!("  Warning: {}", warning);
    }
}
