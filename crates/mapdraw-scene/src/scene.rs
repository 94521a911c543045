use crate::crater::Crater;
use crate::direction::DirectionSector;
use crate::point::Point;
use crate::road::Road;
use crate::tree::Tree;
use mapdraw_core::building::Building;
use mapdraw_core::figure::StyledFigure;
use mapdraw_core::geom::Vec2;

/// Everything one map image shows, already in canvas coordinates.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub size: Vec2,
    /// Canvas units per meter.
    pub scale: f64,
    pub figures: Vec<StyledFigure>,
    pub buildings: Vec<Building>,
    pub roads: Vec<Road>,
    pub trees: Vec<Tree>,
    pub craters: Vec<Crater>,
    pub directions: Vec<DirectionSector>,
    pub points: Vec<Point>,
}

impl Scene {
    pub fn new(size: Vec2, scale: f64) -> Self {
        Self {
            size,
            scale,
            ..Self::default()
        }
    }

    /// Figures in draw order.
    pub fn sorted_figures(&self) -> Vec<&StyledFigure> {
        let mut figures: Vec<&StyledFigure> = self.figures.iter().collect();
        figures.sort_by(|a, b| a.cmp_order(b));
        figures
    }

    /// Points in descending priority; ties keep input order.
    pub fn sorted_points(&self) -> Vec<&Point> {
        let mut points: Vec<&Point> = self.points.iter().collect();
        points.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        points
    }
}
