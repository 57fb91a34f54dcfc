use serde::{Serialize, Deserialize};

/// One input vector and the output the network should produce for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub inputs: Vec<f64>,
    pub targets: Vec<f64>,
}

impl TrainingSample {
    pub fn new(inputs: Vec<f64>, targets: Vec<f64>) -> TrainingSample {
        TrainingSample { inputs, targets }
    }
}
