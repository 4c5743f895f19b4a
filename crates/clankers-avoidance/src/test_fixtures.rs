//! Robot descriptions shared by unit tests.

/// Two Z-axis revolute joints with a fixed end-effector on top.
pub const TWO_LINK_ARM: &str = r#"
    <robot name="two_link_arm">
        <link name="base"/>
        <link name="upper_arm"/>
        <link name="forearm"/>
        <link name="end_effector"/>
        <joint name="shoulder" type="revolute">
            <parent link="base"/><child link="upper_arm"/>
            <origin xyz="0 0 0.05" rpy="0 0 0"/>
            <axis xyz="0 0 1"/>
            <limit lower="-2.617" upper="2.617" effort="50" velocity="3"/>
        </joint>
        <joint name="elbow" type="revolute">
            <parent link="upper_arm"/><child link="forearm"/>
            <origin xyz="0 0 0.3" rpy="0 0 0"/>
            <axis xyz="0 0 1"/>
            <limit lower="-2.094" upper="2.094" effort="30" velocity="5"/>
        </joint>
        <joint name="ee_fixed" type="fixed">
            <parent link="forearm"/><child link="end_effector"/>
            <origin xyz="0 0 0.25"/>
        </joint>
    </robot>
"#;

/// Six revolute joints with alternating axes, plus a camera link hanging
/// off the shoulder on a side branch.
pub const SIX_DOF_ARM: &str = r#"
    <robot name="six_dof_arm">
        <link name="base"/>
        <link name="shoulder_link"/>
        <link name="upper_arm">
            <collision><origin xyz="0 0 0.15"/><geometry><sphere radius="0.06"/></geometry></collision>
        </link>
        <link name="elbow_link"/>
        <link name="forearm">
            <collision><origin xyz="0 0 0.1"/><geometry><sphere radius="0.05"/></geometry></collision>
        </link>
        <link name="wrist_link"/>
        <link name="end_effector">
            <collision><geometry><sphere radius="0.03"/></geometry></collision>
        </link>
        <link name="camera"/>
        <joint name="j1_base_yaw" type="revolute">
            <parent link="base"/><child link="shoulder_link"/>
            <origin xyz="0 0 0.05"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="80" velocity="2"/>
        </joint>
        <joint name="j2_shoulder_pitch" type="revolute">
            <parent link="shoulder_link"/><child link="upper_arm"/>
            <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
            <limit lower="-1.5708" upper="2.356" effort="60" velocity="2"/>
        </joint>
        <joint name="j3_elbow_pitch" type="revolute">
            <parent link="upper_arm"/><child link="elbow_link"/>
            <origin xyz="0 0 0.3"/><axis xyz="0 1 0"/>
            <limit lower="-2.356" upper="2.356" effort="40" velocity="3"/>
        </joint>
        <joint name="j4_forearm_roll" type="revolute">
            <parent link="elbow_link"/><child link="forearm"/>
            <origin xyz="0 0 0.1"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="20" velocity="5"/>
        </joint>
        <joint name="j5_wrist_pitch" type="revolute">
            <parent link="forearm"/><child link="wrist_link"/>
            <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
            <limit lower="-2.094" upper="2.094" effort="10" velocity="5"/>
        </joint>
        <joint name="j6_wrist_roll" type="revolute">
            <parent link="wrist_link"/><child link="end_effector"/>
            <origin xyz="0 0 0.06"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="5" velocity="8"/>
        </joint>
        <joint name="camera_mount" type="revolute">
            <parent link="shoulder_link"/><child link="camera"/>
            <origin xyz="0.05 0 0.1"/><axis xyz="1 0 0"/>
            <limit lower="-1" upper="1" effort="1" velocity="1"/>
        </joint>
    </robot>
"#;
