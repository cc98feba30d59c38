// 領域層：模型與 ports，adapters 與 core 依賴它，反向不成立

pub mod model;
pub mod ports;
