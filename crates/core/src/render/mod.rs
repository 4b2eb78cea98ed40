use crate::board::{default_cells, Board, Cell, Coordinate, GridLayout, Rgb, ScreenPoint};

/// Single side effect requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    Pressed(Coordinate),
    Released(Coordinate),
    Tone(Coordinate),
}

impl BoardEvent {
    pub fn coordinate(&self) -> Coordinate {
        match *self {
            BoardEvent::Pressed(c) | BoardEvent::Released(c) | BoardEvent::Tone(c) => c,
        }
    }
}

/// Headless board backend. It keeps the tile colors current and an ordered log
/// of every event so hosts can replay it and tests can assert on it.
#[derive(Debug, Clone)]
pub struct RecordingBoard {
    layout: GridLayout,
    cells: Vec<Cell>,
    pressed: Vec<bool>,
    events: Vec<BoardEvent>,
}

impl RecordingBoard {
    pub fn new(layout: GridLayout) -> Self {
        let cells = default_cells(layout.size);
        let pressed = vec![false; cells.len()];
        Self {
            layout,
            cells,
            pressed,
            events: Vec::new(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    /// Returns and clears the recorded events.
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_pressed(&self, coordinate: Coordinate) -> bool {
        self.index_of(coordinate)
            .map(|index| self.pressed[index])
            .unwrap_or(false)
    }

    /// Color the tile is currently displaying.
    pub fn current_color(&self, coordinate: Coordinate) -> Option<Rgb> {
        let index = self.index_of(coordinate)?;
        let color = &self.cells[index].color;
        Some(if self.pressed[index] {
            color.pressed
        } else {
            color.unpressed
        })
    }

    fn index_of(&self, coordinate: Coordinate) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.coordinate == coordinate)
    }
}

impl Board for RecordingBoard {
    fn highlight(&mut self, coordinate: Coordinate, pressed: bool) {
        if let Some(index) = self.index_of(coordinate) {
            self.pressed[index] = pressed;
        }
        let event = if pressed {
            BoardEvent::Pressed(coordinate)
        } else {
            BoardEvent::Released(coordinate)
        };
        tracing::trace!(?event, "board event");
        self.events.push(event);
    }

    fn play_tone(&mut self, coordinate: Coordinate) {
        self.events.push(BoardEvent::Tone(coordinate));
    }

    fn resolve_touch(&self, point: ScreenPoint) -> Option<Coordinate> {
        self.layout.resolve(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSize;

    fn board() -> RecordingBoard {
        RecordingBoard::new(GridLayout::new(BoardSize::default(), 100.0, 100.0))
    }

    #[test]
    fn records_events_in_order() {
        let mut board = board();
        let tile = Coordinate::new(1, 0);
        board.highlight(tile, true);
        board.play_tone(tile);
        board.highlight(tile, false);

        assert_eq!(
            board.events(),
            &[
                BoardEvent::Pressed(tile),
                BoardEvent::Tone(tile),
                BoardEvent::Released(tile),
            ]
        );
        assert_eq!(board.take_events().len(), 3);
        assert!(board.events().is_empty());
    }

    #[test]
    fn tracks_pressed_color() {
        let mut board = board();
        let tile = Coordinate::new(0, 1);
        let unpressed = board.current_color(tile).unwrap();

        board.highlight(tile, true);
        assert!(board.is_pressed(tile));
        assert_eq!(board.current_color(tile), Some(Rgb::new(0.0, 0.0, 1.0)));

        board.highlight(tile, false);
        assert_eq!(board.current_color(tile), Some(unpressed));
    }

    #[test]
    fn resolves_touch_through_layout() {
        let board = board();
        assert_eq!(
            board.resolve_touch(ScreenPoint::new(75.0, 25.0)),
            Some(Coordinate::new(1, 0))
        );
        assert_eq!(board.resolve_touch(ScreenPoint::new(175.0, 25.0)), None);
    }
}
