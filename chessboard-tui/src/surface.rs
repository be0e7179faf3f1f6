use crate::scene::{lerp, DraggedPiece, PieceVisual, Scene};
use async_trait::async_trait;
use chess::{Piece, Position, Square};
use chessboard::{BoardLayout, BoardSurface, Highlight, Point, SlideFrom};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Tween step, about 60 fps.
const FRAME: Duration = Duration::from_millis(16);

pub type SharedScene = Arc<Mutex<Scene>>;

/// Lock a shared scene, recovering from a poisoned lock.
pub fn lock_scene(scene: &SharedScene) -> MutexGuard<'_, Scene> {
    scene.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`BoardSurface`] that animates a [`Scene`] for the terminal UI to draw.
#[derive(Clone)]
pub struct TuiSurface {
    scene: SharedScene,
}

impl TuiSurface {
    pub fn new(scene: SharedScene) -> Self {
        Self { scene }
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        lock_scene(&self.scene)
    }
}

/// Call `step` with progress from 0.0 to 1.0 over `duration`, once per frame.
async fn tween(duration: Duration, mut step: impl FnMut(f32) + Send) {
    if duration.is_zero() {
        step(1.0);
        return;
    }
    let start = Instant::now();
    loop {
        let t = (start.elapsed().as_secs_f32() / duration.as_secs_f32()).min(1.0);
        step(t);
        if t >= 1.0 {
            break;
        }
        tokio::time::sleep(FRAME).await;
    }
}

#[async_trait]
impl BoardSurface for TuiSurface {
    fn container_width(&self) -> u32 {
        self.scene().viewport.container_width()
    }

    fn square_offset(&self, square: Square) -> Point {
        self.scene().square_offset(square)
    }

    fn draw_board(&self, layout: &BoardLayout) {
        let mut scene = self.scene();
        scene.layout = Some(*layout);
        scene.highlights.clear();
    }

    fn draw_position(&self, position: &Position) {
        self.scene().set_position(position);
    }

    fn set_highlight(&self, square: Square, highlight: Highlight, on: bool) {
        let mut scene = self.scene();
        if on {
            scene.highlights.insert((square, highlight));
        } else {
            scene.highlights.remove(&(square, highlight));
        }
    }

    fn clear_highlights(&self) {
        self.scene().highlights.clear();
    }

    fn hide_piece(&self, square: Square) {
        if let Some(visual) = self.scene().pieces.get_mut(&square) {
            visual.hidden = true;
        }
    }

    fn show_dragged(&self, piece: Piece, at: Point) {
        self.scene().dragged = Some(DraggedPiece {
            piece,
            at,
            opacity: 1.0,
        });
    }

    fn move_dragged(&self, at: Point) {
        if let Some(dragged) = self.scene().dragged.as_mut() {
            dragged.at = at;
        }
    }

    fn hide_dragged(&self) {
        self.scene().dragged = None;
    }

    async fn fade_in(&self, square: Square, piece: Piece, duration: Duration) {
        // Stays a sprite until fully shown, so a piece fading out of the
        // same square is left alone
        let id = {
            let mut scene = self.scene();
            let at = scene.square_offset(square);
            scene.add_sprite(piece, at, 0.0)
        };
        tween(duration, |t| {
            if let Some(sprite) = self.scene().sprite_mut(id) {
                sprite.opacity = t;
            }
        })
        .await;

        let mut scene = self.scene();
        scene.remove_sprite(id);
        scene.pieces.insert(square, PieceVisual::shown(piece));
    }

    async fn fade_out(&self, square: Square, duration: Duration) {
        let Some(piece) = self.scene().pieces.get(&square).map(|v| v.piece) else {
            return;
        };
        tween(duration, |t| {
            if let Some(visual) = self.scene().pieces.get_mut(&square) {
                if visual.piece == piece {
                    visual.opacity = 1.0 - t;
                }
            }
        })
        .await;

        let mut scene = self.scene();
        if scene.pieces.get(&square).map(|v| v.piece) == Some(piece) {
            scene.pieces.remove(&square);
        }
    }

    async fn slide(&self, from: SlideFrom, to: Square, piece: Piece, duration: Duration) {
        let (start, end, id) = {
            let mut scene = self.scene();
            let start = match from {
                SlideFrom::Square(source) => {
                    scene.pieces.remove(&source);
                    scene.square_offset(source)
                }
                SlideFrom::Spare => scene.spare_slot(piece),
            };
            let end = scene.square_offset(to);
            let id = scene.add_sprite(piece, start, 1.0);
            (start, end, id)
        };

        tween(duration, |t| {
            if let Some(sprite) = self.scene().sprite_mut(id) {
                sprite.at = lerp(start, end, t);
            }
        })
        .await;

        let mut scene = self.scene();
        scene.remove_sprite(id);
        scene.pieces.insert(to, PieceVisual::shown(piece));
    }

    async fn slide_dragged(&self, to: Point, duration: Duration) {
        let Some(start) = self.scene().dragged.map(|d| d.at) else {
            return;
        };
        tween(duration, |t| {
            if let Some(dragged) = self.scene().dragged.as_mut() {
                dragged.at = lerp(start, to, t);
            }
        })
        .await;
    }

    async fn fade_dragged(&self, duration: Duration) {
        tween(duration, |t| {
            if let Some(dragged) = self.scene().dragged.as_mut() {
                dragged.opacity = 1.0 - t;
            }
        })
        .await;
    }

    fn destroy(&self) {
        let mut scene = self.scene();
        scene.layout = None;
        scene.pieces.clear();
        scene.highlights.clear();
        scene.sprites.clear();
        scene.dragged = None;
        scene.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Viewport;
    use chessboard::Orientation;

    fn surface() -> TuiSurface {
        let scene = Scene::new(Viewport {
            left: 0,
            top: 0,
            square_size: 6,
        });
        let surface = TuiSurface::new(Arc::new(Mutex::new(scene)));
        surface.draw_board(&BoardLayout {
            orientation: Orientation::White,
            show_notation: true,
            spare_pieces: false,
            square_size: 6,
        });
        surface
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_container_width_matches_viewport() {
        assert_eq!(surface().container_width(), 49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slide_lands_on_target() {
        let surface = surface();
        let knight: Piece = "wN".parse().unwrap();
        surface.draw_position(&[(sq("g1"), knight)].into_iter().collect());

        surface
            .slide(
                SlideFrom::Square(sq("g1")),
                sq("f3"),
                knight,
                Duration::from_millis(200),
            )
            .await;

        let scene = surface.scene();
        assert!(scene.sprites.is_empty());
        assert!(!scene.pieces.contains_key(&sq("g1")));
        assert_eq!(scene.pieces[&sq("f3")], PieceVisual::shown(knight));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fades() {
        let surface = surface();
        let rook: Piece = "bR".parse().unwrap();

        surface.fade_in(sq("a8"), rook, Duration::from_millis(100)).await;
        assert_eq!(surface.scene().pieces[&sq("a8")].opacity, 1.0);

        surface.fade_out(sq("a8"), Duration::from_millis(100)).await;
        assert!(surface.scene().pieces.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_a_piece_keeps_the_newcomer() {
        let surface = surface();
        let pawn: Piece = "wP".parse().unwrap();
        let queen: Piece = "bQ".parse().unwrap();
        surface.draw_position(&[(sq("e4"), pawn)].into_iter().collect());

        // Clear outlasts the add
        futures::join!(
            surface.fade_in(sq("e4"), queen, Duration::from_millis(100)),
            surface.fade_out(sq("e4"), Duration::from_millis(300)),
        );

        let scene = surface.scene();
        assert_eq!(scene.pieces[&sq("e4")], PieceVisual::shown(queen));
        assert!(scene.sprites.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dragged_piece() {
        let surface = surface();
        let pawn: Piece = "wP".parse().unwrap();
        surface.show_dragged(pawn, Point::new(0, 0));
        surface
            .slide_dragged(Point::new(24, 36), Duration::from_millis(60))
            .await;
        assert_eq!(surface.scene().dragged.unwrap().at, Point::new(24, 36));

        surface.fade_dragged(Duration::ZERO).await;
        assert_eq!(surface.scene().dragged.unwrap().opacity, 0.0);
        surface.hide_dragged();
        assert!(surface.scene().dragged.is_none());
    }

    #[test]
    fn test_highlights_toggle() {
        let surface = surface();
        surface.set_highlight(sq("e2"), Highlight::Source, true);
        surface.set_highlight(sq("e4"), Highlight::Hover, true);
        surface.set_highlight(sq("e4"), Highlight::Hover, false);
        let scene = surface.scene();
        assert!(scene.highlights.contains(&(sq("e2"), Highlight::Source)));
        assert_eq!(scene.highlights.len(), 1);
    }
}
