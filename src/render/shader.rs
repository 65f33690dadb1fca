/// Multi-light Phong pipeline. Lighting is evaluated in view space; both
/// light loops are bounded by the array capacity and stop at the uploaded
/// count.
pub(crate) const SHADER: &str = r#"
const MAX_LIGHTS: u32 = 20u;

struct GlobalUniform {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal: mat4x4<f32>,
}

struct LightUniform {
    point_positions: array<vec4<f32>, 20>,
    point_colors: array<vec4<f32>, 20>,
    directional_vectors: array<vec4<f32>, 20>,
    directional_colors: array<vec4<f32>, 20>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    counts: vec4<u32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(0) @binding(1)
var<uniform> lights: LightUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let view_position = globals.view * globals.model * vec4<f32>(input.position, 1.0);
    out.clip_position = globals.projection * view_position;
    out.view_position = view_position.xyz;

    let normal_to_view = globals.view * globals.normal;
    out.normal = mat3x3<f32>(
        normal_to_view[0].xyz,
        normal_to_view[1].xyz,
        normal_to_view[2].xyz
    ) * input.normal;
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let view_direction = normalize(-input.view_position);
    let shininess = lights.specular.w;

    var ambient = vec3<f32>(0.0);
    var diffuse = vec3<f32>(0.0);
    var specular = vec3<f32>(0.0);
    for (var i = 0u; i < MAX_LIGHTS; i = i + 1u) {
        if (i >= lights.counts.x) {
            break;
        }
        let light_color = lights.point_colors[i].xyz;
        let light_direction = normalize(lights.point_positions[i].xyz - input.view_position);

        ambient += lights.ambient.xyz * light_color * input.color;

        let lambert = max(dot(light_direction, normal), 0.0);
        diffuse += lambert * lights.diffuse.xyz * light_color * input.color;

        let reflected = reflect(-light_direction, normal);
        let highlight = pow(max(dot(view_direction, reflected), 0.0), shininess);
        specular += lights.specular.xyz * highlight * light_color;
    }

    var directional = vec3<f32>(0.0);
    for (var i = 0u; i < MAX_LIGHTS; i = i + 1u) {
        if (i >= lights.counts.y) {
            break;
        }
        let lambert = max(dot(normal, normalize(lights.directional_vectors[i].xyz)), 0.0);
        directional += lambert * lights.directional_colors[i].xyz * input.color;
    }

    return vec4<f32>(ambient + diffuse + specular + directional, 1.0);
}
"#;
