use thiserror::Error;
use wgpu::naga;

/// Entry point every playground shader must export for the vertex stage.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Entry point every playground shader must export for the fragment stage.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Compilation failure with a human-readable, source-spanned description.
///
/// Recoverable by design: the caller presents the description and the user
/// edits the unchanged source and retries.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to parse shader:\n{0}")]
    Parse(String),
    #[error("shader failed validation:\n{0}")]
    Validate(String),
}

/// WGSL source that has passed naga's parser and validator.
///
/// Carries the parsed module so pipeline setup can resolve entry points by
/// name before handing the source to the GPU device.
#[derive(Clone, Debug)]
pub struct ValidatedShader {
    source: String,
    module: naga::Module,
}

impl ValidatedShader {
    /// Parses and validates `source`, returning a module handle on success.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| CompileError::Parse(err.emit_to_string(source)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        );
        validator.validate(&module).map_err(|err| {
            let diagnostic = naga::error::ShaderError {
                source: source.to_string(),
                label: None,
                inner: Box::new(err),
            };
            CompileError::Validate(diagnostic.to_string())
        })?;

        Ok(Self {
            source: source.to_string(),
            module,
        })
    }

    /// The validated WGSL text, handed verbatim to the device.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the module exports `name` as an entry point for `stage`.
    pub(crate) fn has_entry_point(&self, stage: naga::ShaderStage, name: &str) -> bool {
        self.module
            .entry_points
            .iter()
            .any(|entry| entry.stage == stage && entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SHADER: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 1.0, 1.0);
        }
    "#;

    #[test]
    fn valid_shader_compiles_with_both_entry_points() {
        let shader = ValidatedShader::compile(VALID_SHADER).expect("compiles");
        assert!(shader.has_entry_point(naga::ShaderStage::Vertex, VERTEX_ENTRY_POINT));
        assert!(shader.has_entry_point(naga::ShaderStage::Fragment, FRAGMENT_ENTRY_POINT));
    }

    #[test]
    fn missing_entry_point_is_visible_to_pipeline_setup() {
        let fragment_only = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(0.0);
            }
        "#;
        let shader = ValidatedShader::compile(fragment_only).expect("compiles");
        assert!(!shader.has_entry_point(naga::ShaderStage::Vertex, VERTEX_ENTRY_POINT));
        assert!(shader.has_entry_point(naga::ShaderStage::Fragment, FRAGMENT_ENTRY_POINT));
    }

    #[test]
    fn syntax_error_reports_a_spanned_parse_diagnostic() {
        let err = ValidatedShader::compile("fn broken( {").expect_err("must fail");
        match err {
            CompileError::Parse(description) => {
                assert!(description.contains("error"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn type_error_reports_a_diagnostic() {
        let invalid = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return 1.0;
            }
        "#;
        let err = ValidatedShader::compile(invalid).expect_err("must fail");
        assert!(matches!(
            err,
            CompileError::Parse(_) | CompileError::Validate(_)
        ));
    }

    #[test]
    fn failed_compiles_leave_no_shader_behind() {
        assert!(ValidatedShader::compile("not wgsl at all").is_err());
    }
}
