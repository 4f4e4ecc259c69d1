use std::fs;
use std::path::Path;

#[test]
fn test_shader_files_exist() {
    assert!(Path::new("src/shaders/solid.wgsl").exists());
    assert!(Path::new("src/shaders/textured.wgsl").exists());
}

#[test]
fn test_solid_shader_entry_points() {
    let shader = fs::read_to_string("src/shaders/solid.wgsl").expect("read solid shader");

    assert!(shader.contains("@vertex"), "Shader should contain vertex entry point");
    assert!(shader.contains("@fragment"), "Shader should contain fragment entry point");
    assert!(shader.contains("vs_main"), "Shader should have vs_main function");
    assert!(shader.contains("fs_main"), "Shader should have fs_main function");

    assert!(shader.contains("ViewProjection"), "Shader should define ViewProjection struct");
    assert!(shader.contains("@group(0) @binding(0)"), "Shader should bind the view projection");
    assert!(shader.contains("@location(0) position"), "Shader should have position attribute");
    assert!(shader.contains("@location(1) normal"), "Shader should have normal attribute");
    assert!(shader.contains("@location(2) color"), "Shader should have color attribute");
    assert!(shader.contains("view_projection.matrix"), "Shader should apply the view projection matrix");
}

#[test]
fn test_textured_shader_bindings() {
    let shader = fs::read_to_string("src/shaders/textured.wgsl").expect("read textured shader");

    assert!(shader.contains("vs_main") && shader.contains("fs_main"));
    assert!(shader.contains("@group(0) @binding(1)"), "Shader should bind the fish texture");
    assert!(shader.contains("@group(0) @binding(2)"), "Shader should bind the sampler");
    assert!(shader.contains("textureSample"), "Fragment shader should sample the texture");
    assert!(shader.contains("discard"), "Transparent texels should be discarded");
    assert!(shader.contains("@location(1) uv"), "Shader should have a uv attribute");
}
