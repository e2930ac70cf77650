use glam::Vec2;

/// How a source image is mapped onto the screen quad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Fit {
    /// Image covers the whole quad; aspect ratio follows the window.
    #[default]
    Stretch,
    /// Largest uniformly scaled image that fits; the rest is background.
    Contain,
}

impl Fit {
    /// Value of the `fit` field in the shader's uniform block.
    pub fn as_uniform(self) -> u32 {
        match self {
            Fit::Stretch => 0,
            Fit::Contain => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Fit::Stretch => Fit::Contain,
            Fit::Contain => Fit::Stretch,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Fit::Stretch => "stretch",
            Fit::Contain => "contain",
        }
    }
}

/// Map a screen `uv` to the image `uv` it should sample, or `None` where
/// the background shows through. Mirrors `fs_main` in the WGSL source.
pub fn fit_uv(uv: Vec2, window_size: Vec2, image_size: Vec2, fit: Fit) -> Option<Vec2> {
    match fit {
        Fit::Stretch => Some(uv),
        Fit::Contain => {
            if window_size.min_element() <= 0.0 || image_size.min_element() <= 0.0 {
                return None;
            }
            let scale = (window_size / image_size).min_element();
            let extent = image_size * scale / window_size;
            let mapped = (uv - 0.5) / extent + 0.5;
            let inside = mapped.cmpge(Vec2::ZERO).all() && mapped.cmple(Vec2::ONE).all();
            inside.then_some(mapped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_is_identity() {
        let uv = Vec2::new(0.1, 0.9);
        assert_eq!(
            fit_uv(uv, Vec2::new(800.0, 600.0), Vec2::new(16.0, 16.0), Fit::Stretch),
            Some(uv)
        );
    }

    #[test]
    fn contain_matching_aspect_is_identity() {
        let uv = Vec2::new(0.25, 0.75);
        let got = fit_uv(uv, Vec2::new(800.0, 600.0), Vec2::new(400.0, 300.0), Fit::Contain);
        assert!(got.unwrap().abs_diff_eq(uv, 1e-6));
    }

    #[test]
    fn contain_wide_window_letterboxes_sides() {
        // Square image in a 2:1 window occupies the middle half horizontally.
        let window = Vec2::new(200.0, 100.0);
        let image = Vec2::new(50.0, 50.0);
        assert_eq!(fit_uv(Vec2::new(0.1, 0.5), window, image, Fit::Contain), None);
        assert_eq!(fit_uv(Vec2::new(0.9, 0.5), window, image, Fit::Contain), None);

        let left_edge = fit_uv(Vec2::new(0.25, 0.5), window, image, Fit::Contain).unwrap();
        assert!(left_edge.abs_diff_eq(Vec2::new(0.0, 0.5), 1e-6));
        let center = fit_uv(Vec2::splat(0.5), window, image, Fit::Contain).unwrap();
        assert!(center.abs_diff_eq(Vec2::splat(0.5), 1e-6));
    }

    #[test]
    fn contain_tall_window_letterboxes_top_and_bottom() {
        let window = Vec2::new(100.0, 400.0);
        let image = Vec2::new(100.0, 100.0);
        assert_eq!(fit_uv(Vec2::new(0.5, 0.2), window, image, Fit::Contain), None);
        assert!(fit_uv(Vec2::new(0.5, 0.5), window, image, Fit::Contain).is_some());
    }

    #[test]
    fn contain_with_empty_sizes_shows_background() {
        let uv = Vec2::splat(0.5);
        assert_eq!(fit_uv(uv, Vec2::ZERO, Vec2::ONE, Fit::Contain), None);
        assert_eq!(fit_uv(uv, Vec2::ONE, Vec2::new(0.0, 3.0), Fit::Contain), None);
    }

    #[test]
    fn toggle_round_trips() {
        for fit in [Fit::Stretch, Fit::Contain] {
            assert_eq!(fit.toggled().toggled(), fit);
            assert_ne!(fit.toggled(), fit);
        }
    }

    #[test]
    fn uniform_values_are_distinct() {
        assert_ne!(Fit::Stretch.as_uniform(), Fit::Contain.as_uniform());
    }
}
