use std::fs;

use specgen_core::parse::{ModelSpec, model_from_value};
use specgen_core::{CodeGenerator, GeneratorAdapter};
use specgen_typescript::{GenerateOptions, LegacyModelGenerator, ModernModelGenerator, generate};

const PETSTORE_30: &str = include_str!("../../specgen-core/tests/fixtures/petstore-3.0.json");
const PETSTORE_31: &str = include_str!("../../specgen-core/tests/fixtures/petstore-3.1.json");

fn model(json: &str) -> ModelSpec {
    let doc: serde_json::Value = serde_json::from_str(json).unwrap();
    model_from_value(&doc).unwrap()
}

fn file<'a>(files: &'a [specgen_core::GeneratedFile], path: &str) -> &'a str {
    &files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("{path} not generated"))
        .content
}

#[test]
fn legacy_generates_one_file_per_schema_plus_index() {
    let files = LegacyModelGenerator
        .generate(&model(PETSTORE_30), &GenerateOptions::default())
        .unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "models/Pet.ts",
            "models/Owner.ts",
            "models/Priority.ts",
            "models/Species.ts",
            "models/index.ts"
        ]
    );

    let index = file(&files, "models/index.ts");
    assert!(index.contains("export * from \"./Pet\";"));
    assert!(index.contains("export * from \"./Species\";"));
}

#[test]
fn legacy_interface_with_inline_enum() {
    let files = LegacyModelGenerator
        .generate(&model(PETSTORE_30), &GenerateOptions::default())
        .unwrap();
    let pet = file(&files, "models/Pet.ts");

    assert!(pet.starts_with("// Generated by specgen from Petstore 1.0.0. Do not edit.\n"));
    assert!(pet.contains("import type { Owner } from \"./Owner\";"));
    assert!(pet.contains("export interface Pet {"));
    assert!(pet.contains("    id: number;\n"));
    assert!(pet.contains("    name: string;\n"));
    assert!(pet.contains("    tag?: string | null;\n"));
    assert!(pet.contains("    /** Lifecycle status */\n    status?: PetStatusEnum;\n"));
    assert!(pet.contains("    owner?: Owner;\n"));
    assert!(pet.contains(
        "export enum PetStatusEnum {\n    ACTIVE = \"ACTIVE\",\n    DELETING = \"DELETING\",\n}\n"
    ));
}

#[test]
fn top_level_enums() {
    let files = LegacyModelGenerator
        .generate(&model(PETSTORE_30), &GenerateOptions::default())
        .unwrap();

    let species = file(&files, "models/Species.ts");
    assert!(species.contains("    BIRD_OF_PREY = \"bird-of-prey\",\n"));
    let declaration = species.lines().find(|l| l.starts_with("export enum")).unwrap();
    insta::assert_snapshot!(declaration, @"export enum Species {");

    let priority = file(&files, "models/Priority.ts");
    assert!(priority.contains("    NUMBER_1 = 1,\n"));
    assert!(priority.contains("    NUMBER_3 = 3,\n"));
}

#[test]
fn modern_reads_type_arrays_and_const() {
    let files = ModernModelGenerator
        .generate(&model(PETSTORE_31), &GenerateOptions::default())
        .unwrap();
    let pet = file(&files, "models/Pet.ts");
    assert!(pet.contains("    id: string;\n"));
    assert!(pet.contains("    tag?: string | null;\n"));
    assert!(pet.contains("    kind?: \"pet\";\n"));
}

#[test]
fn legacy_ignores_type_arrays() {
    let files = LegacyModelGenerator
        .generate(&model(PETSTORE_31), &GenerateOptions::default())
        .unwrap();
    let pet = file(&files, "models/Pet.ts");
    assert!(pet.contains("    tag?: string;\n"));
    assert!(pet.contains("    kind?: unknown;\n"));
}

#[test]
fn no_jsdoc_drops_descriptions() {
    let options = GenerateOptions {
        no_jsdoc: true,
        ..GenerateOptions::default()
    };
    let files = LegacyModelGenerator.generate(&model(PETSTORE_30), &options).unwrap();
    assert!(!file(&files, "models/Pet.ts").contains("Lifecycle status"));
}

#[test]
fn driver_writes_files_for_selected_adapter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("openapi.json");
    fs::write(&input, PETSTORE_30).unwrap();
    let out = dir.path().join("out");

    let written = generate(
        GeneratorAdapter::Legacy30,
        &input,
        &out,
        &GenerateOptions::default(),
    )
    .unwrap();
    assert_eq!(written.len(), 5);
    assert!(out.join("models/Pet.ts").is_file());
    assert!(out.join("models/index.ts").is_file());
}

#[test]
fn driver_uses_custom_templates() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("model.ts.j2"), "// {{ name }}\n").unwrap();
    fs::write(templates.join("enum.ts.j2"), "").unwrap();
    fs::write(templates.join("index.ts.j2"), "// index\n").unwrap();

    let input = dir.path().join("openapi.json");
    fs::write(&input, PETSTORE_30).unwrap();
    let out = dir.path().join("out");
    let options = GenerateOptions {
        template_dir: Some(templates),
        no_jsdoc: false,
    };
    generate(GeneratorAdapter::Modern31, &input, &out, &options).unwrap();

    assert_eq!(fs::read_to_string(out.join("models/Pet.ts")).unwrap(), "// Pet\n");
    assert_eq!(fs::read_to_string(out.join("models/index.ts")).unwrap(), "// index\n");
}

#[test]
fn driver_rejects_malformed_spec() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("openapi.json");
    fs::write(&input, "{").unwrap();
    let err = generate(
        GeneratorAdapter::Legacy30,
        &input,
        &dir.path().join("out"),
        &GenerateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, specgen_typescript::GenerateError::Spec(_)));
}
