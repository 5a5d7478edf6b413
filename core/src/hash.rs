// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 encoded MD5 hash.
///
/// MD5 is what the backend verifies request signatures with, it is not
/// used for anything else.
pub fn base64_md5(content: &[u8]) -> String {
    base64_encode(&md5::compute(content).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"", "1B2M2Y8AsgTpgAmY7PhCfg=="; "empty")]
    #[test_case(b"abc", "kAFQmDzST7DWlj99KOF/cg=="; "abc")]
    fn test_base64_md5(input: &[u8], expected: &str) {
        assert_eq!(base64_md5(input), expected);
    }
}
