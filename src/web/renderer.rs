//! DOM grid renderer: one `div` per cell inside a CSS grid.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::config::GameConfig;
use crate::game::Renderer;
use crate::grid::{Bounds, Cell};
use crate::input::Direction;

pub struct DomRenderer {
    grid: HtmlElement,
    bounds: Bounds,
    cells: Vec<HtmlElement>, // row-major
}

impl DomRenderer {
    pub fn new(doc: &Document, config: &GameConfig) -> Result<Self, JsValue> {
        let bounds = config.bounds();
        let size = config.cell_size;
        let grid: HtmlElement = doc.create_element("div")?.dyn_into()?;
        grid.set_class_name("horses-grid");
        grid.set_attribute(
            "style",
            &format!(
                "display:grid; grid-template-columns:repeat({w}, {size}px); grid-template-rows:repeat({h}, {size}px); gap:0; padding:8px; border-radius:8px; background:#276749;",
                w = bounds.width,
                h = bounds.height,
            ),
        )?;

        let mut cells = Vec::with_capacity(bounds.area());
        for y in 0..bounds.height {
            for x in 0..bounds.width {
                let cell: HtmlElement = doc.create_element("div")?.dyn_into()?;
                // Checkerboard grass
                let shade = if (x + y) % 2 == 0 { "#38a169" } else { "#2f855a" };
                cell.set_attribute(
                    "style",
                    &format!(
                        "width:{size}px; height:{size}px; display:flex; align-items:center; justify-content:center; font-size:{font}px; user-select:none; background:{shade};",
                        font = size * 3 / 4,
                    ),
                )?;
                grid.append_child(&cell)?;
                cells.push(cell);
            }
        }
        Ok(Self { grid, bounds, cells })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.grid
    }

    fn cell(&self, cell: Cell) -> Option<&HtmlElement> {
        if !self.bounds.contains(cell) {
            return None;
        }
        self.cells.get(cell.y as usize * self.bounds.width as usize + cell.x as usize)
    }
}

/// The horse glyph looks left; everything else is a mirror or a rotation.
fn facing_transform(facing: Option<Direction>) -> &'static str {
    match facing {
        None | Some(Direction::Left) => "none",
        Some(Direction::Right) => "scaleX(-1)",
        Some(Direction::Up) => "rotate(90deg)",
        Some(Direction::Down) => "rotate(-90deg)",
    }
}

impl Renderer for DomRenderer {
    fn clear(&mut self) {
        for cell in &self.cells {
            cell.set_text_content(None);
            cell.style().set_property("transform", "none").ok();
        }
    }

    fn paint(&mut self, cell: Cell, glyph: &str, facing: Option<Direction>) {
        if let Some(el) = self.cell(cell) {
            el.set_text_content(Some(glyph));
            el.style().set_property("transform", facing_transform(facing)).ok();
        }
    }
}
