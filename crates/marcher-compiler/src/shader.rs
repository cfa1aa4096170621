//! Shader template injection

/// Line in a shader template that precedes the default `worldMap`
pub const WORLD_MAP_MARKER: &str = "// WORLD_MAP_PLACEHOLDER";

/// A `worldMap` function returning `expr`
pub fn world_map_function(expr: &str) -> String {
    format!("Col worldMap(vec3 p) {{\n    return {};\n}}", expr)
}

/// Replace the marker and the `worldMap` function after it with one
/// returning `expr`
///
/// Without the marker, the generated function is appended instead.
pub fn inject_world_map(template: &str, expr: &str) -> String {
    let code = world_map_function(expr);

    if let Some(start) = template.find(WORLD_MAP_MARKER) {
        if let Some(offset) = template[start..].find("worldMap") {
            let func_start = start + offset;
            let mut depth = 0usize;
            let mut found_open = false;

            for (i, c) in template[func_start..].char_indices() {
                match c {
                    '{' => {
                        depth += 1;
                        found_open = true;
                    }
                    '}' if found_open => {
                        depth -= 1;
                        if depth == 0 {
                            let func_end = func_start + i + 1;
                            let mut result = String::with_capacity(template.len() + code.len());
                            result.push_str(&template[..start]);
                            result.push_str(&code);
                            result.push_str(&template[func_end..]);
                            return result;
                        }
                    }
                    _ => {}
                }
            }
        }

        tracing::warn!("marker has no complete worldMap after it, appending");
    }

    format!("{}\n{}\n", template.trim_end(), code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
uniform vec3 camLoc;

// WORLD_MAP_PLACEHOLDER
Col worldMap(vec3 p) {
    if (true) { return Col(0.0, vec3(0.0)); }
    return Col(1.0, vec3(0.0));
}

void main() {}
";

    #[test]
    fn test_replaces_default_function() {
        let shader = inject_world_map(TEMPLATE, "Sphere(p)");
        assert!(shader.contains("    return Sphere(p);\n}"));
        assert!(!shader.contains(WORLD_MAP_MARKER));
        assert!(!shader.contains("Col(1.0, vec3(0.0))"));
        assert!(shader.starts_with("uniform vec3 camLoc;"));
        assert!(shader.ends_with("void main() {}\n"));
        assert_eq!(shader.matches("worldMap").count(), 1);
    }

    #[test]
    fn test_appends_without_marker() {
        let shader = inject_world_map("void main() {}\n", "Sphere(p)");
        assert!(shader.starts_with("void main() {}\n"));
        assert!(shader.ends_with("return Sphere(p);\n}\n"));
    }
}
