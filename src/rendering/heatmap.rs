use super::piano_roll::NoteColor;

const HEATMAP_STOPS: [[f32; 3]; 4] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

/// Blue -> green -> yellow -> red gradient over `value` in 0..=1, clamped.
pub fn heatmap(value: f32) -> [f32; 3] {
    let last = HEATMAP_STOPS.len() - 1;
    let (idx1, idx2, fract) = if !(value > 0.0) {
        (0, 0, 0.0)
    } else if value >= 1.0 {
        (last, last, 0.0)
    } else {
        let scaled = value * last as f32;
        let idx1 = scaled.floor() as usize;
        (idx1, idx1 + 1, scaled - idx1 as f32)
    };

    let (a, b) = (HEATMAP_STOPS[idx1], HEATMAP_STOPS[idx2]);
    [
        (b[0] - a[0]) * fract + a[0],
        (b[1] - a[1]) * fract + a[1],
        (b[2] - a[2]) * fract + a[2],
    ]
}

pub fn velocity_color(velocity: u8) -> NoteColor {
    heatmap(velocity as f32 / 127.0).map(|c| (c * 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heatmap_endpoints() {
        assert_eq!(heatmap(0.0), [0.0, 0.0, 1.0]);
        assert_eq!(heatmap(-3.0), [0.0, 0.0, 1.0]);
        assert_eq!(heatmap(1.0), [1.0, 0.0, 0.0]);
        assert_eq!(heatmap(7.0), [1.0, 0.0, 0.0]);
        assert_eq!(heatmap(f32::NAN), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_heatmap_interpolates_between_stops() {
        let [r, g, b] = heatmap(0.5);
        assert_relative_eq!(r, 0.5);
        assert_relative_eq!(g, 1.0);
        assert_relative_eq!(b, 0.0);

        let [r, g, b] = heatmap(1.0 / 6.0);
        assert_relative_eq!(r, 0.0);
        assert_relative_eq!(g, 0.5, epsilon = 1e-6);
        assert_relative_eq!(b, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_velocity_color() {
        assert_eq!(velocity_color(0), [0, 0, 255]);
        assert_eq!(velocity_color(127), [255, 0, 0]);
    }
}
