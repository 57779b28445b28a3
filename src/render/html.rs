// Interactive 3D views: a self-contained HTML page drawing the mesh with plotly.js.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::render::SurfacePlot;
use crate::traits::VertexColor;

const TEMPLATE: &str = include_str!("viewer.html");
const COLORSCALE_STOPS: usize = 11;


#[derive(Serialize)]
struct Mesh3dTrace {
    #[serde(rename = "type")]
    kind: &'static str,
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    i: Vec<i32>,
    j: Vec<i32>,
    k: Vec<i32>,
    vertexcolor: Vec<String>,
    flatshading: bool,
    hoverinfo: &'static str,
    showscale: bool,
    lighting: Value,
}

/// Writes [`SurfacePlot`]s as HTML pages with an interactive plotly.js `mesh3d` view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HtmlRenderer {
    pub title: String,
}

impl HtmlRenderer {
    pub fn new<S: Into<String>>(title: S) -> HtmlRenderer {
        HtmlRenderer { title: title.into() }
    }

    /// Build the complete page.
    pub fn render(&self, plot: &SurfacePlot<'_>) -> Result<String> {
        let mut data = vec![serde_json::to_value(mesh_trace(plot))?];
        if plot.options.colorbar {
            data.push(colorbar_trace(plot));
        }

        let (background, foreground) = if plot.options.dark_background { ("#000000", "#ffffff") } else { ("#ffffff", "#000000") };
        let hidden_axis = json!({ "visible": false, "showgrid": false, "zeroline": false });
        let layout = json!({
            "paper_bgcolor": background,
            "plot_bgcolor": background,
            "font": { "color": foreground },
            "margin": { "l": 0, "r": 0, "t": 0, "b": 0 },
            "showlegend": false,
            "scene": {
                "xaxis": hidden_axis,
                "yaxis": hidden_axis,
                "zaxis": hidden_axis,
                "aspectmode": "data",
                "camera": { "eye": { "x": -1.6, "y": 0.0, "z": 0.3 }, "up": { "x": 0, "y": 0, "z": 1 } }
            }
        });

        Ok(TEMPLATE
            .replace("{{TITLE}}", &escape_html(&self.title))
            .replace("{{BACKGROUND}}", background)
            .replace("{{DATA}}", &serde_json::to_string(&data)?)
            .replace("{{LAYOUT}}", &serde_json::to_string(&layout)?))
    }
}

fn mesh_trace(plot: &SurfacePlot<'_>) -> Mesh3dTrace {
    let mesh = plot.mesh;
    let coords = |dim: usize| mesh.vertices.iter().skip(dim).step_by(3).copied().collect();
    let indices = |corner: usize| mesh.faces.iter().skip(corner).step_by(3).copied().collect();

    let vertexcolor = plot.vertex_color_rgb()
        .chunks(3)
        .map(|rgb| hex_color([rgb[0], rgb[1], rgb[2]]))
        .collect();

    Mesh3dTrace {
        kind: "mesh3d",
        x: coords(0),
        y: coords(1),
        z: coords(2),
        i: indices(0),
        j: indices(1),
        k: indices(2),
        vertexcolor,
        flatshading: false,
        hoverinfo: "skip",
        showscale: false,
        lighting: json!({ "ambient": 0.5, "diffuse": 0.7, "specular": 0.1, "roughness": 0.6 }),
    }
}

/// An invisible marker trace that only carries the colorbar of the plot's color scale.
fn colorbar_trace(plot: &SurfacePlot<'_>) -> Value {
    let colorscale: Vec<Value> = (0..COLORSCALE_STOPS)
        .map(|stop| {
            let t = stop as f64 / (COLORSCALE_STOPS - 1) as f64;
            json!([t, hex_color(plot.options.colormap.eval(t))])
        })
        .collect();
    let center = plot.mesh.center().unwrap_or([0.0; 3]);

    json!({
        "type": "scatter3d",
        "mode": "markers",
        "x": [center[0]],
        "y": [center[1]],
        "z": [center[2]],
        "hoverinfo": "skip",
        "marker": {
            "size": 0,
            "opacity": 0,
            "color": [plot.scale.vmin],
            "colorscale": colorscale,
            "cmin": plot.scale.vmin,
            "cmax": plot.scale.vmax,
            "showscale": true,
            "colorbar": { "thickness": 20, "len": 0.6 }
        }
    })
}

fn hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
