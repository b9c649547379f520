use regex::Regex;
use std::collections::BTreeSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SHADER_DIR: &str = "shader";

const ENTRY_POINTS: &[&str] = &["mesh.vert", "mesh.frag", "shadow.vert", "shadow.frag"];

struct Preprocessed {
    code: String,
    defines: BTreeSet<String>,
    uniform_blocks: BTreeSet<String>,
    texture_units: BTreeSet<String>,
}

fn main() {
    built::write_built_file().expect("failed to acquire build-time information");

    let include = Regex::new(r#"^#include <([[:graph:]]*)>$"#).unwrap();
    let define = Regex::new(r#"^#pragma define ([A-Z_][A-Z0-9_]*)$"#).unwrap();
    let block = Regex::new(r#"^layout\(std140\) uniform ([A-Za-z_][A-Za-z0-9_]*) \{"#).unwrap();
    let sampler = Regex::new(r#"^uniform (?:[a-z]+ )?[a-zA-Z0-9]*sampler[a-zA-Z0-9]* ([A-Za-z_][A-Za-z0-9_]*);"#).unwrap();

    let mut output = String::new();

    for &entry in ENTRY_POINTS {
        let mut shader = Preprocessed {
            code: String::new(),
            defines: BTreeSet::new(),
            uniform_blocks: BTreeSet::new(),
            texture_units: BTreeSet::new(),
        };

        expand(entry, &include, &mut shader);

        for line in shader.code.lines() {
            let line = line.trim();

            if let Some(captures) = define.captures(line) {
                shader.defines.insert(captures[1].to_owned());
            }

            if let Some(captures) = block.captures(line) {
                shader.uniform_blocks.insert(captures[1].to_owned());
            }

            if let Some(captures) = sampler.captures(line) {
                shader.texture_units.insert(captures[1].to_owned());
            }
        }

        let code: String = shader
            .code
            .lines()
            .filter(|line| !define.is_match(line.trim()))
            .map(|line| format!("{}\n", line))
            .collect();

        writeln!(
            output,
            "pub static {}: ShaderInfo = ShaderInfo {{ name: {:?}, code: {:?}, defines: &{:?}, uniform_blocks: &{:?}, texture_units: &{:?} }};",
            entry.replace('.', "_").to_uppercase(),
            entry,
            code,
            shader.defines.iter().collect::<Vec<_>>(),
            shader.uniform_blocks.iter().collect::<Vec<_>>(),
            shader.texture_units.iter().collect::<Vec<_>>(),
        )
        .unwrap();
    }

    let path = Path::new(&env::var("OUT_DIR").unwrap()).join("glsl_shaders.rs");
    fs::write(path, output).expect("failed to write shader table");

    println!("cargo:rerun-if-changed={}", SHADER_DIR);
}

/// Inlines includes, tagging every file boundary with a position marker.
fn expand(file: &str, include: &Regex, shader: &mut Preprocessed) {
    let path = Path::new(SHADER_DIR).join(file);
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("failed to read shader '{}'", path.display()));

    println!("cargo:rerun-if-changed={}", path.display());

    writeln!(shader.code, "// __POS__ {}:1", file).unwrap();

    for (index, line) in source.lines().enumerate() {
        if let Some(captures) = include.captures(line.trim()) {
            expand(&captures[1], include, shader);
            writeln!(shader.code, "// __POS__ {}:{}", file, index + 2).unwrap();
        } else {
            writeln!(shader.code, "{}", line).unwrap();
        }
    }
}
