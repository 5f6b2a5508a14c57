//! Cycle breaking.
//!
//! A depth-first walk in node order marks every edge that closes onto a node
//! still on the walk's stack. Reversing exactly those edges leaves a DAG. The
//! walk keeps its own stack, so long dependency chains cannot exhaust the call
//! stack.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Edges oriented so the graph is acyclic, and how many were flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acyclic {
    pub edges: Vec<(usize, usize)>,
    pub reversed: usize,
}

/// Reverse the back edges of `edges` over nodes `0..node_count`.
///
/// Output edges keep input order. Self loops are reported as reversed but
/// remain loops; callers drop them beforehand.
pub fn make_acyclic(node_count: usize, edges: &[(usize, usize)]) -> Acyclic {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (index, &(source, target)) in edges.iter().enumerate() {
        adjacency[source].push((target, index));
    }

    let mut state = vec![Visit::New; node_count];
    let mut back = vec![false; edges.len()];

    for start in 0..node_count {
        if state[start] != Visit::New {
            continue;
        }
        state[start] = Visit::Active;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            if let Some(&(next, edge)) = adjacency[node].get(cursor) {
                frame.1 += 1;
                match state[next] {
                    Visit::New => {
                        state[next] = Visit::Active;
                        stack.push((next, 0));
                    }
                    Visit::Active => back[edge] = true,
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }

    let oriented = edges
        .iter()
        .zip(&back)
        .map(|(&(source, target), &flip)| if flip { (target, source) } else { (source, target) })
        .collect();

    Acyclic {
        edges: oriented,
        reversed: back.iter().filter(|&&flip| flip).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_acyclic(node_count: usize, edges: &[(usize, usize)]) -> bool {
        let mut indegree = vec![0usize; node_count];
        for &(_, target) in edges {
            indegree[target] += 1;
        }
        let mut ready: Vec<usize> = (0..node_count).filter(|&n| indegree[n] == 0).collect();
        let mut seen = 0;
        while let Some(node) = ready.pop() {
            seen += 1;
            for &(source, target) in edges {
                if source == node {
                    indegree[target] -= 1;
                    if indegree[target] == 0 {
                        ready.push(target);
                    }
                }
            }
        }
        seen == node_count
    }

    #[test]
    fn dag_is_untouched() {
        let edges = [(0, 1), (1, 2), (0, 2)];
        let result = make_acyclic(3, &edges);
        assert_eq!(result.edges, edges);
        assert_eq!(result.reversed, 0);
    }

    #[test]
    fn three_cycle_flips_one_edge() {
        let result = make_acyclic(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(result.reversed, 1);
        assert_eq!(result.edges, vec![(0, 1), (1, 2), (0, 2)]);
        assert!(is_acyclic(3, &result.edges));
    }

    #[test]
    fn nested_cycles_become_acyclic() {
        let edges = [(0, 1), (1, 0), (1, 2), (2, 3), (3, 1), (3, 4), (4, 2)];
        let result = make_acyclic(5, &edges);
        assert!(is_acyclic(5, &result.edges));
        assert_eq!(result.edges.len(), edges.len());
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 50_000;
        let mut edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        edges.push((n - 1, 0));
        let result = make_acyclic(n, &edges);
        assert_eq!(result.reversed, 1);
    }
}
