use ndarray::{Array, ArrayView, Ix1, Ix2};

pub type Tensor1 = Array<f32, Ix1>;
pub type Tensor2 = Array<f32, Ix2>;

pub type TensorView1<'a> = ArrayView<'a, f32, Ix1>;
pub type TensorView2<'a> = ArrayView<'a, f32, Ix2>;
