use super::lexer::RedirectOp;

/// 一条流水线：一个或多个按 | 相连的阶段，顺序即进程创建顺序
#[derive(Debug, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// 流水线中的一个阶段：命令名、参数，以及已从参数向量摘出的重定向
#[derive(Debug, Clone, Default)]
pub struct Stage {
    pub program: String,
    pub arguments: Vec<String>,
    pub redirections: Vec<Redirection>,
}

#[derive(Debug, Clone)]
pub struct Redirection {
    pub operator: RedirectOp,
    pub target: String,
}
