use serde::{Deserialize, Serialize};

/// Width × height × depth of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub sx: usize,
    pub sy: usize,
    pub depth: usize,
}

impl Shape {
    pub fn new(sx: usize, sy: usize, depth: usize) -> Shape {
        Shape { sx, sy, depth }
    }

    /// A 1×1×depth shape, the layout used for feature vectors.
    pub fn flat(depth: usize) -> Shape {
        Shape { sx: 1, sy: 1, depth }
    }

    /// Number of scalars in a volume of this shape.
    pub fn len(&self) -> usize {
        self.sx * self.sy * self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fixed-shape 3-D array of values with a parallel array of gradients.
///
/// Elements are stored row-major with depth fastest: `(x, y, d)` lives at
/// `((y * sx) + x) * depth + d`. Both arrays always hold `shape.len()` values;
/// they are only exposed as slices so that invariant cannot be broken.
#[derive(Debug, Clone, PartialEq)]
pub struct Vol {
    shape: Shape,
    w: Vec<f64>,
    dw: Vec<f64>,
}

impl Vol {
    pub fn zeros(shape: Shape) -> Vol {
        Vol::filled(shape, 0.0)
    }

    pub fn filled(shape: Shape, value: f64) -> Vol {
        let n = shape.len();
        Vol {
            shape,
            w: vec![value; n],
            dw: vec![0.0; n],
        }
    }

    /// Builds a 1×1×n volume from a flat list of values.
    pub fn from_vec(values: Vec<f64>) -> Vol {
        let shape = Shape::flat(values.len());
        Vol::from_parts(shape, values)
    }

    /// Builds a volume with an explicit shape.
    ///
    /// # Panics
    /// Panics if `values.len()` differs from `shape.len()`.
    pub fn from_parts(shape: Shape, values: Vec<f64>) -> Vol {
        assert_eq!(
            values.len(),
            shape.len(),
            "volume of shape {}x{}x{} needs {} values",
            shape.sx,
            shape.sy,
            shape.depth,
            shape.len()
        );
        let dw = vec![0.0; values.len()];
        Vol { shape, w: values, dw }
    }

    /// A zero-valued volume with the same shape as `self`.
    pub fn zeros_like(&self) -> Vol {
        Vol::zeros(self.shape)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn sx(&self) -> usize {
        self.shape.sx
    }

    pub fn sy(&self) -> usize {
        self.shape.sy
    }

    pub fn depth(&self) -> usize {
        self.shape.depth
    }

    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    pub fn w(&self) -> &[f64] {
        &self.w
    }

    pub fn w_mut(&mut self) -> &mut [f64] {
        &mut self.w
    }

    pub fn dw(&self) -> &[f64] {
        &self.dw
    }

    pub fn dw_mut(&mut self) -> &mut [f64] {
        &mut self.dw
    }

    /// Values and gradients borrowed mutably at the same time.
    pub fn split_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.w, &mut self.dw)
    }

    fn index(&self, x: usize, y: usize, d: usize) -> usize {
        assert!(
            x < self.shape.sx && y < self.shape.sy && d < self.shape.depth,
            "coordinate ({x}, {y}, {d}) outside volume {}x{}x{}",
            self.shape.sx,
            self.shape.sy,
            self.shape.depth
        );
        ((y * self.shape.sx) + x) * self.shape.depth + d
    }

    pub fn get(&self, x: usize, y: usize, d: usize) -> f64 {
        self.w[self.index(x, y, d)]
    }

    pub fn set(&mut self, x: usize, y: usize, d: usize, value: f64) {
        let ix = self.index(x, y, d);
        self.w[ix] = value;
    }

    pub fn add(&mut self, x: usize, y: usize, d: usize, value: f64) {
        let ix = self.index(x, y, d);
        self.w[ix] += value;
    }

    pub fn get_grad(&self, x: usize, y: usize, d: usize) -> f64 {
        self.dw[self.index(x, y, d)]
    }

    pub fn set_grad(&mut self, x: usize, y: usize, d: usize, value: f64) {
        let ix = self.index(x, y, d);
        self.dw[ix] = value;
    }

    pub fn add_grad(&mut self, x: usize, y: usize, d: usize, value: f64) {
        let ix = self.index(x, y, d);
        self.dw[ix] += value;
    }

    pub fn zero_grad(&mut self) {
        self.dw.iter_mut().for_each(|g| *g = 0.0);
    }

    /// Index of the largest value; 0 for an empty volume.
    pub fn argmax(&self) -> usize {
        self.w
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_constructor_is_one_by_one() {
        let v = Vol::from_vec(vec![0.2, -0.3, 0.5]);
        assert_eq!(v.shape(), Shape::new(1, 1, 3));
        assert_eq!(v.w(), &[0.2, -0.3, 0.5]);
        assert_eq!(v.dw(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn coordinates_are_depth_fastest() {
        let mut v = Vol::zeros(Shape::new(3, 2, 4));
        v.set(2, 1, 3, 7.0);
        assert_eq!(v.w()[((3 + 2) * 4) + 3], 7.0);
        v.add_grad(1, 0, 2, 1.5);
        v.add_grad(1, 0, 2, 1.0);
        assert_eq!(v.get_grad(1, 0, 2), 2.5);
        assert_eq!(v.dw()[4 + 2], 2.5);
    }

    #[test]
    fn zero_grad_keeps_values() {
        let mut v = Vol::from_vec(vec![1.0, 2.0]);
        v.dw_mut()[1] = 3.0;
        v.zero_grad();
        assert_eq!(v.w(), &[1.0, 2.0]);
        assert_eq!(v.dw(), &[0.0, 0.0]);
    }

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(Vol::from_vec(vec![0.1, 0.7, 0.2]).argmax(), 1);
    }

    #[test]
    #[should_panic(expected = "outside volume")]
    fn out_of_range_coordinate_panics() {
        Vol::zeros(Shape::flat(2)).get(0, 0, 2);
    }

    #[test]
    #[should_panic(expected = "needs 6 values")]
    fn from_parts_checks_length() {
        Vol::from_parts(Shape::new(1, 2, 3), vec![0.0; 5]);
    }
}
